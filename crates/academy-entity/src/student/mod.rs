//! Student and guardian entities.

pub mod model;

pub use model::{Guardian, Student, StudentContact};
