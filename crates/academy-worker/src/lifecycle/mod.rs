//! Subscription lifecycle sweeps.
//!
//! A sweep is evaluated against an explicit `as_of`, producing candidates
//! that the executor either applies or only previews. Dry-run and apply
//! share the evaluator, so both see the same candidate set for the same
//! snapshot.

pub mod candidate;
pub mod evaluator;
pub mod executor;
pub mod report;
pub mod sweeper;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use candidate::{Candidate, LifecycleAction, TriggerReason};
pub use evaluator::{Evaluation, LifecycleEvaluator, SkippedItem};
pub use executor::{Outcome, TransitionExecutor};
pub use report::{ItemReport, SweepGroup, SweepReport, SweepSummary};
pub use sweeper::LifecycleSweeper;

/// Which lifecycle threshold a sweep evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "sweep", rename_all = "snake_case")]
pub enum Sweep {
    /// ACTIVE subscriptions ending N days from now.
    ExpiringReminders,
    /// PENDING subscriptions older than the timeout.
    PendingCleanup {
        /// Payment timeout in hours.
        timeout_hours: i64,
    },
    /// ACTIVE subscriptions whose grace deadline passed.
    GraceSuspension,
}

impl Sweep {
    /// Operator-facing command name, also used as the lock key.
    pub fn command_name(&self) -> &'static str {
        match self {
            Self::ExpiringReminders => "check-expiring-subscriptions",
            Self::PendingCleanup { .. } => "cleanup-expired-pending",
            Self::GraceSuspension => "suspend-expired-grace",
        }
    }
}

impl fmt::Display for Sweep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command_name())
    }
}

/// Whether a sweep mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Persist transitions and send notifications.
    Apply,
    /// Report what would happen; never writes.
    DryRun,
}

impl RunMode {
    /// `DryRun` when `dry_run` is set.
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Apply }
    }

    /// Whether this mode writes.
    pub fn is_apply(&self) -> bool {
        matches!(self, Self::Apply)
    }
}
