//! Finds subscriptions crossing a lifecycle threshold.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use academy_core::config::LifecycleConfig;
use academy_core::config::lifecycle::check_pending_timeout;
use academy_core::error::AppError;
use academy_core::result::AppResult;
use academy_core::types::SubscriptionId;
use academy_database::traits::{DispatchLog, StudentDirectory, SubscriptionRepository};
use academy_entity::notification::DispatchKey;

use super::Sweep;
use super::candidate::{Candidate, LifecycleAction, TriggerReason};

/// A subscription the evaluator had to leave out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    /// The subscription.
    pub subscription_id: SubscriptionId,
    /// Why it was left out.
    pub reason: String,
}

/// Result of evaluating one sweep.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Candidates in processing order.
    pub candidates: Vec<Candidate>,
    /// Matches that could not become candidates.
    pub skipped: Vec<SkippedItem>,
    /// Reminder matches whose dedup key was already taken.
    pub already_notified: usize,
}

/// Turns repository snapshots into candidates.
///
/// Reads only; never consults a clock. Given the same `as_of` and the same
/// data it returns the same candidates in the same order.
#[derive(Clone)]
pub struct LifecycleEvaluator {
    subscriptions: Arc<dyn SubscriptionRepository>,
    students: Arc<dyn StudentDirectory>,
    dispatch_log: Arc<dyn DispatchLog>,
    config: LifecycleConfig,
}

impl LifecycleEvaluator {
    /// Creates a new evaluator.
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        students: Arc<dyn StudentDirectory>,
        dispatch_log: Arc<dyn DispatchLog>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            subscriptions,
            students,
            dispatch_log,
            config,
        }
    }

    /// Evaluate `sweep` at `as_of`.
    pub async fn evaluate(&self, sweep: Sweep, as_of: DateTime<Utc>) -> AppResult<Evaluation> {
        match sweep {
            Sweep::ExpiringReminders => self.expiring(as_of).await,
            Sweep::PendingCleanup { timeout_hours } => self.pending(as_of, timeout_hours).await,
            Sweep::GraceSuspension => self.grace(as_of).await,
        }
    }

    /// Distinct reminder thresholds in configured order.
    fn thresholds(&self) -> Vec<u32> {
        let mut seen = Vec::with_capacity(self.config.reminder_days.len());
        for days in &self.config.reminder_days {
            if !seen.contains(days) {
                seen.push(*days);
            }
        }
        seen
    }

    async fn expiring(&self, as_of: DateTime<Utc>) -> AppResult<Evaluation> {
        let mut evaluation = Evaluation::default();

        for days_left in self.thresholds() {
            let (start, end) = reminder_window(as_of, days_left);
            let matches = self
                .subscriptions
                .find_active_ending_between(start, end)
                .await?;
            debug!(days_left, %start, matches = matches.len(), "Evaluated reminder window");

            for subscription in matches {
                if !subscription.is_active_ending_between(start, end) {
                    continue;
                }

                let key = DispatchKey::new(subscription.id, days_left, subscription.end_date);
                if self.dispatch_log.was_sent(&key).await? {
                    debug!(%key, "Reminder already sent");
                    evaluation.already_notified += 1;
                    continue;
                }

                let Some(contact) = self.students.find_contact(subscription.student_id).await?
                else {
                    warn!(
                        subscription_id = %subscription.id,
                        student_id = %subscription.student_id,
                        "Student not found, reminder skipped"
                    );
                    evaluation.skipped.push(SkippedItem {
                        subscription_id: subscription.id,
                        reason: format!("student {} not found", subscription.student_id),
                    });
                    continue;
                };

                evaluation.candidates.push(Candidate {
                    subscription,
                    contact: Some(contact),
                    action: LifecycleAction::Notify { days_left },
                    reason: TriggerReason::ExpiresIn { days_left },
                    trigger_time: as_of,
                });
            }
        }

        Ok(evaluation)
    }

    async fn pending(&self, as_of: DateTime<Utc>, timeout_hours: i64) -> AppResult<Evaluation> {
        let (timeout, cutoff) = pending_cutoff(as_of, timeout_hours)?;
        let candidates = self
            .subscriptions
            .find_pending_created_before(cutoff)
            .await?
            .into_iter()
            .filter(|s| s.is_pending_stale(as_of, timeout))
            .map(|subscription| Candidate {
                subscription,
                contact: None,
                action: LifecycleAction::Cancel,
                reason: TriggerReason::PendingTimeout { timeout_hours },
                trigger_time: as_of,
            })
            .collect();

        Ok(Evaluation {
            candidates,
            ..Evaluation::default()
        })
    }

    async fn grace(&self, as_of: DateTime<Utc>) -> AppResult<Evaluation> {
        let candidates = self
            .subscriptions
            .find_active_with_grace_before(as_of)
            .await?
            .into_iter()
            .filter_map(|subscription| {
                let ends_at = subscription.grace_period_ends_at()?;
                subscription.is_grace_expired(as_of).then(|| Candidate {
                    subscription,
                    contact: None,
                    action: LifecycleAction::Suspend,
                    reason: TriggerReason::GraceExpired {
                        grace_period_ends_at: ends_at,
                    },
                    trigger_time: as_of,
                })
            })
            .collect();

        Ok(Evaluation {
            candidates,
            ..Evaluation::default()
        })
    }
}

impl std::fmt::Debug for LifecycleEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleEvaluator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The timeout and the `created_at` cutoff for a pending sweep.
pub fn pending_cutoff(
    as_of: DateTime<Utc>,
    timeout_hours: i64,
) -> AppResult<(Duration, DateTime<Utc>)> {
    let hours = check_pending_timeout(timeout_hours)?;
    let timeout = Duration::try_hours(hours)
        .ok_or_else(|| AppError::validation(format!("Pending timeout of {hours} hours is too large")))?;
    let cutoff = as_of
        .checked_sub_signed(timeout)
        .ok_or_else(|| AppError::validation(format!("Pending timeout of {hours} hours is too large")))?;
    Ok((timeout, cutoff))
}

/// `[00:00 of as_of + days, 00:00 of the following day)` in UTC.
pub fn reminder_window(as_of: DateTime<Utc>, days_left: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = (as_of + Duration::days(days_left as i64)).date_naive();
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}
