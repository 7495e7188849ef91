//! Subscription reminders and in-app notification housekeeping.

pub mod dispatcher;
pub mod payload;
pub mod service;

pub use dispatcher::{DbNotificationDispatcher, NotificationDispatcher, OutgoingNotification};
pub use payload::ReminderPayload;
pub use service::{NotificationService, PurgeSelector};
