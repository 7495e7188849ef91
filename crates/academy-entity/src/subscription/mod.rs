//! Subscription domain entities.

pub mod metadata;
pub mod model;
pub mod status;

pub use metadata::SubscriptionMetadata;
pub use model::Subscription;
pub use status::{SubscriptionKind, SubscriptionStatus};
