//! Subscription lifecycle sweeps, session scheduling and the background
//! worker that runs them.
//!
//! This crate provides:
//! - The lifecycle sweeps (expiry reminders, pending cleanup, grace suspension)
//! - The recording stop sweep
//! - [`SchedulerContext`], which wires every collaborator and runs any task
//! - A worker runner and cron scheduler that execute the same tasks from
//!   the job queue

pub mod context;
pub mod executor;
pub mod jobs;
pub mod lifecycle;
pub mod lock;
pub mod queue;
pub mod recording;
pub mod runner;
pub mod scheduler;
pub mod task;

pub use context::SchedulerContext;
pub use lifecycle::{LifecycleSweeper, RunMode, Sweep, SweepReport};
pub use lock::LocalSweepLock;
pub use recording::{RecordingStopReport, RecordingSweep};
pub use runner::WorkerRunner;
pub use scheduler::CronScheduler;
pub use task::TaskReport;
