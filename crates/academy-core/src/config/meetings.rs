//! Meeting and recording provider configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the external meeting/recording provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingsConfig {
    /// Whether the provider is configured. When disabled, room preparation
    /// and recording stops are reported as errors instead of attempted.
    #[serde(default)]
    pub enabled: bool,
    /// Provider REST base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for MeetingsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_base_url(),
            api_key: String::new(),
            request_timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:7880".to_string()
}

fn default_timeout() -> u64 {
    10
}
