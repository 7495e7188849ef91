//! # academy-database
//!
//! PostgreSQL connection management, the repository traits the scheduler
//! is written against, and their sqlx implementations.

pub mod connection;
pub mod lock;
pub mod migration;
pub mod outbox;
pub mod repositories;
pub mod traits;

pub use connection::DatabasePool;
pub use lock::PgAdvisoryLock;
pub use outbox::PgEventPublisher;
pub use repositories::Repositories;
pub use traits::*;
