//! CLI command definitions and dispatch.

pub mod grace;
pub mod migrate;
pub mod notification;
pub mod session;
pub mod sweep;
pub mod worker;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use academy_core::config::AppConfig;
use academy_core::error::AppError;
use academy_core::result::AppResult;
use academy_database::DatabasePool;
use academy_entity::job::{JobPayload, JobPriority};
use academy_worker::lifecycle::RunMode;
use academy_worker::queue::JobQueue;
use academy_worker::{SchedulerContext, TaskReport};

use crate::output::{self, OutputFormat};

/// Academy lifecycle scheduler operations
#[derive(Debug, Parser)]
#[command(name = "academy", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send expiry reminders for subscriptions crossing a threshold
    CheckExpiringSubscriptions(sweep::ExpiringArgs),
    /// Cancel PENDING subscriptions that were never paid
    CleanupExpiredPending(sweep::PendingArgs),
    /// Suspend ACTIVE subscriptions whose grace period ended
    SuspendExpiredGrace(sweep::DryRunArgs),
    /// Stop recordings that ran past their session's end
    StopExpiredRecordings(sweep::DryRunArgs),
    /// Generate sessions from weekly schedule templates
    GenerateSessions(session::GenerateArgs),
    /// Prepare meeting rooms for sessions about to start
    PrepareSessions(session::PrepareArgs),
    /// Grant a grace period to an active subscription
    GrantGrace(grace::GrantGraceArgs),
    /// Delete in-app notifications
    PurgeNotifications(notification::PurgeArgs),
    /// Job queue status and manual triggers
    Worker(worker::WorkerArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> AppResult<()> {
        let format = self.format;
        match &self.command {
            Commands::CheckExpiringSubscriptions(args) => {
                sweep::expiring(args, &self.config, format).await
            }
            Commands::CleanupExpiredPending(args) => {
                sweep::pending(args, &self.config, format).await
            }
            Commands::SuspendExpiredGrace(args) => {
                let payload = JobPayload::SuspendExpiredGrace;
                sweep::run_inline(&payload, args.dry_run, &self.config, format).await
            }
            Commands::StopExpiredRecordings(args) => {
                let payload = JobPayload::StopExpiredRecordings;
                sweep::run_inline(&payload, args.dry_run, &self.config, format).await
            }
            Commands::GenerateSessions(args) => {
                session::generate(args, &self.config, format).await
            }
            Commands::PrepareSessions(args) => session::prepare(args, &self.config, format).await,
            Commands::GrantGrace(args) => grace::execute(args, &self.config, format).await,
            Commands::PurgeNotifications(args) => {
                notification::execute(args, &self.config).await
            }
            Commands::Worker(args) => worker::execute(args, &self.config, format).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> AppResult<AppConfig> {
    AppConfig::load(config_path)
}

/// Helper: connect to the database and wire the scheduler context
pub async fn connect(config_path: &str) -> AppResult<SchedulerContext> {
    let config = load_config(config_path)?;
    let db = DatabasePool::connect(&config.database).await?;
    SchedulerContext::from_database(&db, config)
}

/// Run `payload` now at the context clock and print its report.
///
/// Fails when a real run hit persistence errors, so the process exits 1.
pub async fn run_task(
    ctx: &SchedulerContext,
    payload: &JobPayload,
    mode: RunMode,
    format: OutputFormat,
) -> AppResult<TaskReport> {
    let as_of = ctx.clock.now();
    let report = ctx.run_task(payload, as_of, mode).await?;
    output::print_task_report(&report, format);

    if mode.is_apply() && report.has_transactional_failures() {
        return Err(AppError::database(format!(
            "{} finished with persistence failures",
            payload.job_type()
        )));
    }
    Ok(report)
}

/// Put `payload` on the sweep queue instead of running it here.
pub async fn enqueue(ctx: &SchedulerContext, payload: JobPayload) -> AppResult<()> {
    let queue = JobQueue::new(ctx.jobs.clone(), cli_worker_id());
    let job_type = payload.job_type();
    let job = queue.enqueue(payload, JobPriority::High).await?;
    output::print_success(&format!("Job '{job_type}' enqueued (id: {})", job.id));
    Ok(())
}

fn cli_worker_id() -> String {
    format!("cli-{}", std::process::id())
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|day| day.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|_| format!("'{value}' is neither an RFC 3339 timestamp nor a YYYY-MM-DD date"))
}

/// Ask before a destructive step unless `force` was given.
pub fn confirm(prompt: &str, force: bool) -> AppResult<bool> {
    if force {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_instant_date() {
        assert_eq!(
            parse_instant("2025-03-01").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_instant_rfc3339_with_offset() {
        assert_eq!(
            parse_instant("2025-03-01T12:00:00+03:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_instant_rejects_garbage() {
        assert!(parse_instant("next tuesday").is_err());
    }

    #[test]
    fn test_cli_parses_sweep_flags() {
        let cli = Cli::try_parse_from([
            "academy",
            "--format",
            "json",
            "cleanup-expired-pending",
            "--hours",
            "24",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::CleanupExpiredPending(args) => {
                assert_eq!(args.hours, Some(24));
                assert!(args.dry_run);
                assert!(!args.force);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_pending_hours_out_of_range() {
        for hours in ["0", "-1", "8761", "4000000000000000"] {
            let parsed = Cli::try_parse_from([
                "academy",
                "cleanup-expired-pending",
                "--hours",
                hours,
            ]);
            assert!(parsed.is_err(), "--hours {hours} should be rejected");
        }
        assert!(
            Cli::try_parse_from(["academy", "cleanup-expired-pending", "--hours", "8760"]).is_ok()
        );
    }

    #[test]
    fn test_cli_purge_requires_selector_value() {
        assert!(
            Cli::try_parse_from(["academy", "purge-notifications", "--before"]).is_err()
        );
    }
}
