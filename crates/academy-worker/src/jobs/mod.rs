//! Job handlers for queued sweeps.

pub mod sweep;

use std::sync::Arc;

use academy_entity::job::JobPayload;

pub use sweep::SweepJobHandler;

use crate::context::SchedulerContext;
use crate::executor::JobExecutor;

/// Register a handler for every known job type.
pub fn register_all(executor: &mut JobExecutor, ctx: Arc<SchedulerContext>) {
    for job_type in JobPayload::known_types() {
        executor.register(Arc::new(SweepJobHandler::new(job_type, Arc::clone(&ctx))));
    }
}
