//! Core type definitions used across the academy workspace.

pub mod id;

pub use id::*;
