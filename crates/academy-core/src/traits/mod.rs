//! Core traits defined in `academy-core` and implemented by other crates.

pub mod clock;
pub mod events;
pub mod lock;

pub use clock::{Clock, FixedClock, SystemClock};
pub use events::{EventPublisher, publish_or_warn};
pub use lock::{SweepLease, SweepLock};
