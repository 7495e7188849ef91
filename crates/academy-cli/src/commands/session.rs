//! Session generation and room preparation commands.

use clap::Args;

use academy_core::result::AppResult;
use academy_entity::job::JobPayload;
use academy_worker::lifecycle::RunMode;

use crate::output::OutputFormat;

/// Arguments for generate-sessions
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Enqueue for the worker instead of generating here
    #[arg(long)]
    pub queue: bool,
    /// Horizon in weeks (defaults to sessions.generation_weeks)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=52))]
    pub weeks: Option<u32>,
}

/// Arguments for prepare-sessions
#[derive(Debug, Args)]
pub struct PrepareArgs {
    /// Enqueue for the worker instead of preparing here
    #[arg(long)]
    pub queue: bool,
    /// Prepare again sessions that are already ready
    #[arg(long)]
    pub force: bool,
}

/// generate-sessions
pub async fn generate(args: &GenerateArgs, config_path: &str, format: OutputFormat) -> AppResult<()> {
    dispatch(
        JobPayload::GenerateSessions { weeks: args.weeks },
        args.queue,
        config_path,
        format,
    )
    .await
}

/// prepare-sessions
pub async fn prepare(args: &PrepareArgs, config_path: &str, format: OutputFormat) -> AppResult<()> {
    dispatch(
        JobPayload::PrepareSessions { force: args.force },
        args.queue,
        config_path,
        format,
    )
    .await
}

async fn dispatch(
    payload: JobPayload,
    queue: bool,
    config_path: &str,
    format: OutputFormat,
) -> AppResult<()> {
    let ctx = super::connect(config_path).await?;
    if queue {
        return super::enqueue(&ctx, payload).await;
    }
    super::run_task(&ctx, &payload, RunMode::Apply, format).await?;
    Ok(())
}
