//! Session generation and room preparation.

pub mod generation;
pub mod preparation;

pub use generation::{GenerationReport, SessionGenerator};
pub use preparation::{PreparationReport, SessionPreparer};
