//! Sweep reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use academy_core::types::SubscriptionId;
use academy_entity::subscription::SubscriptionKind;

use super::candidate::{Candidate, LifecycleAction};
use super::evaluator::SkippedItem;
use super::executor::Outcome;
use super::{RunMode, Sweep};

/// Counters for one sweep run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Candidates the evaluator produced.
    pub candidates: usize,
    /// Candidates applied.
    pub applied: usize,
    /// Candidates previewed in dry-run mode.
    pub previewed: usize,
    /// Matches skipped during evaluation or execution.
    pub skipped: usize,
    /// Reminder matches already sent earlier.
    pub already_notified: usize,
    /// Candidates that failed.
    pub errors: usize,
    /// Failures raised by the database.
    pub transactional: usize,
}

/// Candidates sharing a subscription kind and action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepGroup {
    /// Subscription kind.
    pub kind: SubscriptionKind,
    /// Action applied or proposed.
    pub action: LifecycleAction,
    /// Number of candidates.
    pub count: usize,
}

/// One line per candidate or evaluator skip.
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    /// The subscription.
    pub subscription_id: SubscriptionId,
    /// Subscription kind, when known.
    pub kind: Option<SubscriptionKind>,
    /// Human label.
    pub label: String,
    /// Action, or "-" for evaluator skips.
    pub action: String,
    /// Why the item was selected or skipped.
    pub reason: String,
    /// `applied`, `previewed`, `skipped` or `failed`.
    pub outcome: String,
    /// Error or skip detail.
    pub detail: Option<String>,
}

/// Everything a sweep did, for the CLI and the job result column.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// Command name of the sweep.
    pub sweep: String,
    /// Reference time.
    pub as_of: DateTime<Utc>,
    /// Apply or dry run.
    pub mode: RunMode,
    /// Another run held the lock, nothing was evaluated.
    pub locked: bool,
    /// Counters.
    pub summary: SweepSummary,
    /// Candidates grouped by kind and action.
    pub groups: Vec<SweepGroup>,
    /// Per-item detail.
    pub items: Vec<ItemReport>,
}

impl SweepReport {
    /// Empty report for a sweep about to run.
    pub fn new(sweep: Sweep, as_of: DateTime<Utc>, mode: RunMode) -> Self {
        Self {
            sweep: sweep.command_name().to_string(),
            as_of,
            mode,
            locked: false,
            summary: SweepSummary::default(),
            groups: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Report for a sweep that did not run because the lock was busy.
    pub fn skipped_locked(sweep: Sweep, as_of: DateTime<Utc>, mode: RunMode) -> Self {
        Self {
            locked: true,
            ..Self::new(sweep, as_of, mode)
        }
    }

    /// Record the candidate set, before any candidate is applied.
    pub fn record_candidates(&mut self, candidates: &[Candidate]) {
        self.summary.candidates = candidates.len();

        let mut groups: BTreeMap<(SubscriptionKind, LifecycleAction), usize> = BTreeMap::new();
        for candidate in candidates {
            *groups
                .entry((candidate.subscription.kind, candidate.action))
                .or_default() += 1;
        }
        self.groups = groups
            .into_iter()
            .map(|((kind, action), count)| SweepGroup {
                kind,
                action,
                count,
            })
            .collect();
    }

    /// Record evaluator skips.
    pub fn record_skipped(&mut self, skipped: &[SkippedItem], already_notified: usize) {
        self.summary.skipped += skipped.len();
        self.summary.already_notified += already_notified;
        self.items.extend(skipped.iter().map(|item| ItemReport {
            subscription_id: item.subscription_id,
            kind: None,
            label: String::new(),
            action: "-".to_string(),
            reason: item.reason.clone(),
            outcome: "skipped".to_string(),
            detail: None,
        }));
    }

    /// Record the outcome for one candidate.
    pub fn record_outcome(&mut self, candidate: &Candidate, outcome: &Outcome) {
        let detail = match outcome {
            Outcome::Applied => {
                self.summary.applied += 1;
                None
            }
            Outcome::Previewed => {
                self.summary.previewed += 1;
                None
            }
            Outcome::Skipped(reason) => {
                self.summary.skipped += 1;
                Some(reason.clone())
            }
            Outcome::Failed(e) => {
                self.summary.errors += 1;
                if e.is_persistence() {
                    self.summary.transactional += 1;
                }
                Some(e.to_string())
            }
        };

        self.items.push(ItemReport {
            subscription_id: candidate.subscription.id,
            kind: Some(candidate.subscription.kind),
            label: candidate.subscription.label(),
            action: candidate.action.to_string(),
            reason: candidate.reason.to_string(),
            outcome: outcome.label().to_string(),
            detail,
        });
    }

    /// Whether the run should exit non-zero.
    pub fn has_transactional_failures(&self) -> bool {
        self.summary.transactional > 0
    }
}
