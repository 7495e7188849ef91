//! Academy Scheduler: subscription and session lifecycle daemon
//!
//! Main entry point that wires all crates together, registers the cron
//! schedule and runs the job worker until a shutdown signal arrives.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use academy_core::config::AppConfig;
use academy_core::error::AppError;
use academy_database::connection::{DatabasePool, mask_password};
use academy_worker::SchedulerContext;
use academy_worker::executor::JobExecutor;
use academy_worker::queue::JobQueue;
use academy_worker::runner::WorkerRunner;
use academy_worker::scheduler::CronScheduler;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Scheduler error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("ACADEMY_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

    AppConfig::load(&config_path)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main daemon run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting academy-scheduler v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!(
        url = %mask_password(&config.database.url),
        "Connecting to database..."
    );
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    db.migrate().await?;
    if !db.health_check().await? {
        return Err(AppError::service_unavailable("Database health check failed"));
    }
    tracing::info!("Database ready");

    // ── Step 2: Scheduler context ────────────────────────────────
    let ctx = Arc::new(SchedulerContext::from_database(&db, config.clone())?);
    tracing::info!(
        meetings_enabled = config.meetings.enabled,
        "Scheduler context initialized"
    );

    // ── Step 3: Job queue + handlers ─────────────────────────────
    let worker_id = format!("worker-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
    let queue = Arc::new(JobQueue::new(Arc::clone(&ctx.jobs), worker_id));

    let mut executor = JobExecutor::new();
    academy_worker::jobs::register_all(&mut executor, Arc::clone(&ctx));
    let executor = Arc::new(executor);
    tracing::info!(handlers = ?executor.registered_types(), "Job handlers registered");

    // ── Step 4: Cron schedule ────────────────────────────────────
    let scheduler = CronScheduler::new(Arc::clone(&queue)).await?;
    scheduler.register_all(&config.schedule).await?;
    scheduler.start().await?;

    // ── Step 5: Start background worker ──────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker_handle = if config.worker.enabled {
        tracing::info!("Starting background worker...");
        let runner = WorkerRunner::new(Arc::clone(&queue), executor, config.worker.clone());
        let cancel = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            runner.run(cancel).await;
        }))
    } else {
        tracing::info!("Background worker disabled; scheduled jobs are only enqueued");
        None
    };

    tracing::info!(worker_id = %queue.worker_id(), "academy-scheduler running");

    // ── Step 6: Graceful shutdown ────────────────────────────────
    shutdown_signal().await?;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!(error = %e, "Cron scheduler did not shut down cleanly");
    }
    let _ = shutdown_tx.send(true);

    if let Some(handle) = worker_handle {
        let grace = std::time::Duration::from_secs(config.worker.shutdown_timeout_seconds + 5);
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Worker did not stop within the shutdown timeout");
        }
    }

    db.close().await;
    tracing::info!("academy-scheduler shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() -> Result<(), AppError> {
    #[cfg(unix)]
    {
        let mut terminate =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
