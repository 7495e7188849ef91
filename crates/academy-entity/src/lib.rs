//! # academy-entity
//!
//! Domain entity models for the academy scheduler. Every struct in this
//! crate represents a database table row or a domain value object. All
//! entities derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and
//! database entities additionally derive `sqlx::FromRow`.

pub mod job;
pub mod notification;
pub mod session;
pub mod student;
pub mod subscription;
