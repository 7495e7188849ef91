//! Worker queue CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use academy_core::error::AppError;
use academy_core::result::AppResult;
use academy_entity::job::{Job, JobPayload, JobPriority, JobStatus, SWEEP_QUEUE};
use academy_worker::queue::JobQueue;

use crate::output::{self, OutputFormat};

/// Arguments for worker commands
#[derive(Debug, Args)]
pub struct WorkerArgs {
    /// Worker subcommand
    #[command(subcommand)]
    pub command: WorkerCommand,
}

/// Worker subcommands
#[derive(Debug, Subcommand)]
pub enum WorkerCommand {
    /// Show queue status and recent jobs
    Status {
        /// Only list jobs in this status
        #[arg(long)]
        status: Option<String>,
        /// How many recent jobs to list
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Enqueue a sweep job by type
    Trigger {
        /// Job type, e.g. `cleanup_expired_pending`
        job_type: String,
        /// JSON payload with the job's options
        #[arg(short, long, default_value = "{}")]
        payload: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct JobRow {
    id: String,
    job_type: String,
    status: String,
    attempts: String,
    scheduled_at: String,
    error: String,
}

impl From<&Job> for JobRow {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_string(),
            job_type: job.job_type.clone(),
            status: job.status.to_string(),
            attempts: format!("{}/{}", job.attempts, job.max_attempts),
            scheduled_at: job.scheduled_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            error: job.error_message.clone().unwrap_or_default(),
        }
    }
}

/// Execute worker commands
pub async fn execute(args: &WorkerArgs, config_path: &str, format: OutputFormat) -> AppResult<()> {
    let ctx = super::connect(config_path).await?;
    let queue = JobQueue::new(ctx.jobs.clone(), format!("cli-{}", std::process::id()));

    match &args.command {
        WorkerCommand::Status { status, limit } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let stats = queue.stats(SWEEP_QUEUE).await?;
            let jobs = queue.recent(status, *limit).await?;

            match format {
                OutputFormat::Json => output::print_item(
                    &serde_json::json!({ "queue": SWEEP_QUEUE, "stats": stats, "jobs": jobs }),
                    format,
                ),
                OutputFormat::Table => {
                    println!("Worker Queue Status ({SWEEP_QUEUE}):");
                    output::print_kv("Pending", &stats.pending.to_string());
                    output::print_kv("Running", &stats.running.to_string());
                    output::print_kv("Completed", &stats.completed.to_string());
                    output::print_kv("Failed", &stats.failed.to_string());
                    output::print_kv("Worker Enabled", &ctx.config.worker.enabled.to_string());
                    output::print_kv("Concurrency", &ctx.config.worker.concurrency.to_string());
                    println!();
                    let rows: Vec<JobRow> = jobs.iter().map(JobRow::from).collect();
                    output::print_list(&rows, format);
                }
            }
        }
        WorkerCommand::Trigger { job_type, payload } => {
            let value: serde_json::Value = serde_json::from_str(payload)
                .map_err(|e| AppError::validation(format!("Invalid JSON payload: {e}")))?;
            let payload = parse_payload(job_type, &value)?;

            let job = queue.enqueue(payload, JobPriority::High).await?;
            output::print_success(&format!("Job '{job_type}' enqueued (id: {})", job.id));
        }
    }

    Ok(())
}

fn parse_status(value: &str) -> AppResult<JobStatus> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|_| AppError::validation(format!("Unknown job status '{value}'")))
}

fn parse_payload(job_type: &str, value: &serde_json::Value) -> AppResult<JobPayload> {
    if !JobPayload::known_types().contains(&job_type) {
        return Err(AppError::validation(format!(
            "Unknown job type '{job_type}'; expected one of: {}",
            JobPayload::known_types().join(", ")
        )));
    }
    let payload = JobPayload::from_job(job_type, value)
        .map_err(|e| AppError::validation(format!("Invalid payload for {job_type}: {e}")))?;
    payload.validate()?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payload_rejects_unknown_type() {
        let err = parse_payload("reindex", &serde_json::json!({})).unwrap_err();
        assert!(err.message.contains("Unknown job type"));
    }

    #[test]
    fn test_parse_payload_with_options() {
        let payload =
            parse_payload("generate_sessions", &serde_json::json!({ "weeks": 2 })).unwrap();
        assert_eq!(payload, JobPayload::GenerateSessions { weeks: Some(2) });
    }

    #[test]
    fn test_parse_payload_rejects_out_of_range_hours() {
        for hours in [-1, 0, 4_000_000_000_000_000_i64] {
            let err = parse_payload("cleanup_expired_pending", &serde_json::json!({ "hours": hours }))
                .unwrap_err();
            assert_eq!(err.kind, academy_core::error::ErrorKind::Validation);
        }
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Failed").unwrap(), JobStatus::Failed);
        assert!(parse_status("stuck").is_err());
    }
}
