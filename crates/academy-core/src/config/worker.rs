//! Background worker and cron schedule configuration.

use serde::{Deserialize, Serialize};

/// Background job worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of concurrent job processing tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Interval in seconds between job queue polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Seconds to wait for in-flight jobs on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            concurrency: default_concurrency(),
            poll_interval_seconds: default_poll_interval(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

/// Six-field cron expressions (`sec min hour dom mon dow`) for each sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Expiry reminder sweep.
    #[serde(default = "default_expiring")]
    pub check_expiring_subscriptions: String,
    /// Stale pending subscription cleanup.
    #[serde(default = "default_pending")]
    pub cleanup_expired_pending: String,
    /// Grace deadline suspension sweep.
    #[serde(default = "default_grace")]
    pub suspend_expired_grace: String,
    /// Recurring session generation.
    #[serde(default = "default_generate")]
    pub generate_sessions: String,
    /// Meeting room preparation for upcoming sessions.
    #[serde(default = "default_prepare")]
    pub prepare_sessions: String,
    /// Recording stop sweep.
    #[serde(default = "default_recordings")]
    pub stop_expired_recordings: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            check_expiring_subscriptions: default_expiring(),
            cleanup_expired_pending: default_pending(),
            suspend_expired_grace: default_grace(),
            generate_sessions: default_generate(),
            prepare_sessions: default_prepare(),
            stop_expired_recordings: default_recordings(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    2
}

fn default_poll_interval() -> u64 {
    5
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_expiring() -> String {
    "0 0 9 * * *".to_string()
}

fn default_pending() -> String {
    "0 0 * * * *".to_string()
}

fn default_grace() -> String {
    "0 15 * * * *".to_string()
}

fn default_generate() -> String {
    "0 0 1 * * *".to_string()
}

fn default_prepare() -> String {
    "0 */5 * * * *".to_string()
}

fn default_recordings() -> String {
    "0 * * * * *".to_string()
}
