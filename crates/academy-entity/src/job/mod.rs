//! Queued sweep jobs.

pub mod model;
pub mod payload;
pub mod status;

pub use model::{CreateJob, Job};
pub use payload::{JobPayload, SWEEP_QUEUE};
pub use status::{JobPriority, JobStatus};
