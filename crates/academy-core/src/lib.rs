//! # academy-core
//!
//! Core crate for the academy lifecycle scheduler. Contains configuration
//! schemas, typed identifiers, domain events, the clock and sweep-lock
//! traits, and the unified error system.
//!
//! This crate has **no** internal dependencies on other academy crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
