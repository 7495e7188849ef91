//! Runs one lifecycle sweep end to end.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use academy_core::events::{DomainEvent, SystemEvent};
use academy_core::result::AppResult;
use academy_core::traits::{EventPublisher, SweepLock, publish_or_warn};

use super::evaluator::LifecycleEvaluator;
use super::executor::TransitionExecutor;
use super::report::SweepReport;
use super::{RunMode, Sweep};

/// Lock, evaluate, apply or preview, report.
#[derive(Clone)]
pub struct LifecycleSweeper {
    evaluator: LifecycleEvaluator,
    executor: TransitionExecutor,
    lock: Arc<dyn SweepLock>,
    events: Arc<dyn EventPublisher>,
}

impl LifecycleSweeper {
    /// Creates a new sweeper.
    pub fn new(
        evaluator: LifecycleEvaluator,
        executor: TransitionExecutor,
        lock: Arc<dyn SweepLock>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            evaluator,
            executor,
            lock,
            events,
        }
    }

    /// Run `sweep` at `as_of`.
    ///
    /// Apply runs hold the sweep's lock for the whole batch; when another
    /// holder has it the report comes back with `locked` set and nothing
    /// evaluated. Dry runs never write and do not take the lock.
    pub async fn run(&self, sweep: Sweep, as_of: DateTime<Utc>, mode: RunMode) -> AppResult<SweepReport> {
        let _lease = if mode.is_apply() {
            match self.lock.try_acquire(sweep.command_name()).await? {
                Some(lease) => Some(lease),
                None => {
                    info!(sweep = %sweep, "Sweep already running elsewhere, skipped");
                    return Ok(SweepReport::skipped_locked(sweep, as_of, mode));
                }
            }
        } else {
            None
        };

        info!(sweep = %sweep, %as_of, mode = ?mode, "Sweep started");

        let evaluation = self.evaluator.evaluate(sweep, as_of).await?;
        let mut report = SweepReport::new(sweep, as_of, mode);
        report.record_candidates(&evaluation.candidates);
        report.record_skipped(&evaluation.skipped, evaluation.already_notified);

        for candidate in &evaluation.candidates {
            debug!(
                subscription_id = %candidate.subscription.id,
                action = %candidate.action,
                reason = %candidate.reason,
                "Processing candidate"
            );
            let outcome = self.executor.apply(candidate, mode, as_of).await;
            report.record_outcome(candidate, &outcome);
        }

        let summary = &report.summary;
        info!(
            sweep = %sweep,
            candidates = summary.candidates,
            applied = summary.applied,
            previewed = summary.previewed,
            skipped = summary.skipped,
            errors = summary.errors,
            "Sweep finished"
        );

        if mode.is_apply() {
            publish_or_warn(
                self.events.as_ref(),
                DomainEvent::at(
                    as_of,
                    SystemEvent::SweepCompleted {
                        sweep: report.sweep.clone(),
                        candidates: summary.candidates,
                        applied: summary.applied,
                        errors: summary.errors,
                    }
                    .into(),
                ),
            )
            .await;
        }

        Ok(report)
    }
}

impl std::fmt::Debug for LifecycleSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleSweeper")
            .field("lock", &self.lock)
            .finish_non_exhaustive()
    }
}
