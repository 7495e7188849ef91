//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod lifecycle;
pub mod logging;
pub mod meetings;
pub mod sessions;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::lifecycle::LifecycleConfig;
pub use self::logging::LoggingConfig;
pub use self::meetings::MeetingsConfig;
pub use self::sessions::SessionsConfig;
pub use self::worker::{ScheduleConfig, WorkerConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (base file + environment overlay) and
/// `ACADEMY__*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Cron expressions for the periodic sweeps.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Subscription lifecycle thresholds.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// Session generation and preparation settings.
    #[serde(default)]
    pub sessions: SessionsConfig,
    /// Meeting/recording provider settings.
    #[serde(default)]
    pub meetings: MeetingsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the given base file with an optional `config/{ACADEMY_ENV}`
    /// overlay and environment variables prefixed with `ACADEMY__`.
    pub fn load(config_path: &str) -> Result<Self, AppError> {
        let base = config_path.trim_end_matches(".toml");
        let env = std::env::var("ACADEMY_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ACADEMY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject configurations the sweeps cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::configuration("database.url must not be empty"));
        }
        if self.lifecycle.reminder_days.is_empty() {
            return Err(AppError::configuration(
                "lifecycle.reminder_days must list at least one threshold",
            ));
        }
        if self.lifecycle.reminder_days.contains(&0) {
            return Err(AppError::configuration(
                "lifecycle.reminder_days thresholds must be positive",
            ));
        }
        if let Err(e) = lifecycle::check_pending_timeout(self.lifecycle.pending_timeout_hours) {
            return Err(AppError::configuration(format!(
                "lifecycle.pending_timeout_hours: {}",
                e.message
            )));
        }
        if let Err(e) = sessions::check_generation_weeks(self.sessions.generation_weeks) {
            return Err(AppError::configuration(format!(
                "sessions.generation_weeks: {}",
                e.message
            )));
        }
        if self.worker.concurrency == 0 {
            return Err(AppError::configuration("worker.concurrency must be at least 1"));
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
