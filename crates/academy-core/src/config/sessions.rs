//! Session generation and preparation settings.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Furthest generation horizon, in weeks.
pub const MAX_GENERATION_WEEKS: u32 = 52;

/// Reject a generation horizon outside `1..=MAX_GENERATION_WEEKS`.
pub fn check_generation_weeks(weeks: u32) -> Result<u32, AppError> {
    if !(1..=MAX_GENERATION_WEEKS).contains(&weeks) {
        return Err(AppError::validation(format!(
            "Generation horizon must be between 1 and {MAX_GENERATION_WEEKS} weeks, got {weeks}"
        )));
    }
    Ok(weeks)
}

/// Settings for recurring session generation and room preparation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// How many weeks ahead sessions are generated.
    #[serde(default = "default_generation_weeks")]
    pub generation_weeks: u32,
    /// Sessions starting within this many minutes get their room prepared.
    #[serde(default = "default_prepare_window")]
    pub prepare_window_minutes: i64,
    /// Duration assumed for sessions without an explicit duration.
    #[serde(default = "default_duration")]
    pub default_duration_minutes: i64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            generation_weeks: default_generation_weeks(),
            prepare_window_minutes: default_prepare_window(),
            default_duration_minutes: default_duration(),
        }
    }
}

fn default_generation_weeks() -> u32 {
    4
}

fn default_prepare_window() -> i64 {
    30
}

fn default_duration() -> i64 {
    60
}
