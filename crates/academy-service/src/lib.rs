//! # academy-service
//!
//! Services the lifecycle sweeps call into: notification delivery, the
//! meeting and recording provider, session generation and preparation,
//! grace periods, and notification housekeeping.
//!
//! Services follow constructor injection; all collaborators are passed in
//! as `Arc` trait objects.

pub mod meeting;
pub mod notification;
pub mod session;
pub mod subscription;

pub use meeting::{HttpMeetingClient, LocalRoomProvider, MeetingProvider, RecordingCapable, RecordingRegistry};
pub use notification::{
    DbNotificationDispatcher, NotificationDispatcher, NotificationService, OutgoingNotification,
    PurgeSelector, ReminderPayload,
};
pub use session::{GenerationReport, PreparationReport, SessionGenerator, SessionPreparer};
pub use subscription::GraceService;
