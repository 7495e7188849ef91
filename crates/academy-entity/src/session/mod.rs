//! Scheduled session, recording, and recurring template entities.

pub mod model;
pub mod recording;
pub mod status;
pub mod template;

pub use model::{NewSession, Session};
pub use recording::{Recording, RecordingStatus};
pub use status::{SessionKind, SessionStatus};
pub use template::ScheduleTemplate;
