//! Subscription lifecycle and recording sweep commands.

use clap::Args;

use academy_core::config::lifecycle::MAX_PENDING_TIMEOUT_HOURS;
use academy_core::result::AppResult;
use academy_entity::job::JobPayload;
use academy_worker::TaskReport;
use academy_worker::lifecycle::RunMode;

use crate::output::{self, OutputFormat};

/// Arguments for check-expiring-subscriptions
#[derive(Debug, Args)]
pub struct ExpiringArgs {
    /// Report what would be sent without sending
    #[arg(long, conflicts_with = "queue")]
    pub dry_run: bool,
    /// Enqueue the sweep for the worker instead of running it here
    #[arg(long)]
    pub queue: bool,
}

/// Arguments for cleanup-expired-pending
#[derive(Debug, Args)]
pub struct PendingArgs {
    /// Payment timeout in hours (defaults to lifecycle.pending_timeout_hours)
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_PENDING_TIMEOUT_HOURS))]
    pub hours: Option<i64>,
    /// Report what would be cancelled without cancelling
    #[arg(long)]
    pub dry_run: bool,
    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

/// Arguments for sweeps that only take `--dry-run`
#[derive(Debug, Args)]
pub struct DryRunArgs {
    /// Report what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// check-expiring-subscriptions
pub async fn expiring(args: &ExpiringArgs, config_path: &str, format: OutputFormat) -> AppResult<()> {
    let payload = JobPayload::CheckExpiringSubscriptions;
    if args.queue {
        let ctx = super::connect(config_path).await?;
        return super::enqueue(&ctx, payload).await;
    }
    run_inline(&payload, args.dry_run, config_path, format).await
}

/// cleanup-expired-pending
///
/// A real run previews first and asks before cancelling anything.
pub async fn pending(args: &PendingArgs, config_path: &str, format: OutputFormat) -> AppResult<()> {
    let ctx = super::connect(config_path).await?;
    let payload = JobPayload::CleanupExpiredPending { hours: args.hours };

    if args.dry_run {
        super::run_task(&ctx, &payload, RunMode::DryRun, format).await?;
        return Ok(());
    }

    if !args.force {
        let as_of = ctx.clock.now();
        let preview = ctx.run_task(&payload, as_of, RunMode::DryRun).await?;
        let candidates = match &preview {
            TaskReport::Lifecycle(report) => report.summary.candidates,
            _ => 0,
        };
        if candidates == 0 {
            output::print_success("No stale pending subscriptions.");
            return Ok(());
        }
        output::print_task_report(&preview, format);
        let prompt = format!("Cancel {candidates} pending subscription(s)?");
        if !super::confirm(&prompt, false)? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    super::run_task(&ctx, &payload, RunMode::Apply, format).await?;
    Ok(())
}

/// Run a sweep here, in apply or dry-run mode.
pub async fn run_inline(
    payload: &JobPayload,
    dry_run: bool,
    config_path: &str,
    format: OutputFormat,
) -> AppResult<()> {
    let ctx = super::connect(config_path).await?;
    super::run_task(&ctx, payload, RunMode::from_dry_run(dry_run), format).await?;
    Ok(())
}
