//! In-app notification and reminder dedup entities.

pub mod dispatch;
pub mod model;

pub use dispatch::DispatchKey;
pub use model::{CreateNotification, Notification, NotificationType};
