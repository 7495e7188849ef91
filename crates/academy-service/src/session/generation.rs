//! Materializes weekly templates into concrete sessions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use academy_core::events::{DomainEvent, SessionEvent};
use academy_core::result::AppResult;
use academy_core::traits::{EventPublisher, publish_or_warn};
use academy_database::traits::{
    ScheduleTemplateRepository, SessionRepository, SubscriptionRepository,
};
use academy_entity::session::ScheduleTemplate;
use academy_entity::subscription::SubscriptionStatus;

/// Outcome of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Active templates considered.
    pub templates: usize,
    /// Sessions inserted.
    pub created: usize,
    /// Slots that already had a session.
    pub existing: usize,
    /// Slots after the subscription's end date.
    pub beyond_end: usize,
    /// Templates whose subscription is missing or not active.
    pub skipped_templates: usize,
    /// Templates that failed part-way.
    pub errors: usize,
    /// Failures raised by the database.
    pub transactional: usize,
}

impl GenerationReport {
    /// Whether any failure should fail the command.
    pub fn has_transactional_failures(&self) -> bool {
        self.transactional > 0
    }
}

#[derive(Debug, Default)]
struct TemplateOutcome {
    created: usize,
    existing: usize,
    beyond_end: usize,
    skipped: bool,
}

/// Generates sessions from active schedule templates.
///
/// Inserts are keyed on `(template_id, scheduled_at)`, so regenerating the
/// same horizon creates nothing new.
#[derive(Clone)]
pub struct SessionGenerator {
    templates: Arc<dyn ScheduleTemplateRepository>,
    sessions: Arc<dyn SessionRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    events: Arc<dyn EventPublisher>,
}

impl SessionGenerator {
    /// Creates a new generator.
    pub fn new(
        templates: Arc<dyn ScheduleTemplateRepository>,
        sessions: Arc<dyn SessionRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            templates,
            sessions,
            subscriptions,
            events,
        }
    }

    /// Generate every slot after `as_of` within `weeks` weeks.
    pub async fn generate(&self, as_of: DateTime<Utc>, weeks: u32) -> AppResult<GenerationReport> {
        let templates = self.templates.find_active().await?;
        let mut report = GenerationReport {
            templates: templates.len(),
            ..GenerationReport::default()
        };

        info!(templates = templates.len(), weeks, %as_of, "Generating sessions");

        for template in &templates {
            match self.generate_for(template, as_of, weeks).await {
                Ok(outcome) => {
                    report.created += outcome.created;
                    report.existing += outcome.existing;
                    report.beyond_end += outcome.beyond_end;
                    if outcome.skipped {
                        report.skipped_templates += 1;
                    }
                    if outcome.created > 0 {
                        publish_or_warn(
                            self.events.as_ref(),
                            DomainEvent::at(
                                as_of,
                                SessionEvent::Generated {
                                    template_id: template.id,
                                    created: outcome.created as u32,
                                }
                                .into(),
                            ),
                        )
                        .await;
                    }
                }
                Err(e) => {
                    warn!(template_id = %template.id, error = %e, "Session generation failed");
                    report.errors += 1;
                    if e.is_persistence() {
                        report.transactional += 1;
                    }
                }
            }
        }

        info!(
            created = report.created,
            existing = report.existing,
            errors = report.errors,
            "Session generation finished"
        );
        Ok(report)
    }

    async fn generate_for(
        &self,
        template: &ScheduleTemplate,
        as_of: DateTime<Utc>,
        weeks: u32,
    ) -> AppResult<TemplateOutcome> {
        let mut outcome = TemplateOutcome::default();

        let ends_at = match template.subscription_id {
            Some(subscription_id) => match self.subscriptions.find_by_id(subscription_id).await? {
                Some(sub) if sub.status == SubscriptionStatus::Active => Some(sub.end_date),
                other => {
                    debug!(
                        template_id = %template.id,
                        status = ?other.map(|s| s.status),
                        "Template subscription is not active"
                    );
                    outcome.skipped = true;
                    return Ok(outcome);
                }
            },
            None => None,
        };

        for slot in template.occurrences(as_of, weeks) {
            if ends_at.is_some_and(|end| slot >= end) {
                outcome.beyond_end += 1;
                continue;
            }
            if self
                .sessions
                .create_if_absent(template.to_new_session(slot))
                .await?
            {
                outcome.created += 1;
            } else {
                outcome.existing += 1;
            }
        }

        Ok(outcome)
    }
}

impl std::fmt::Debug for SessionGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGenerator").finish_non_exhaustive()
    }
}
