//! Typed job payloads.
//!
//! Every sweep the CLI can run inline can also be queued. The payload
//! carries the same options the command accepts.

use serde::{Deserialize, Serialize};

use academy_core::config::lifecycle::check_pending_timeout;
use academy_core::config::sessions::check_generation_weeks;
use academy_core::error::AppError;

use super::model::CreateJob;
use super::status::JobPriority;

/// Queue all sweep jobs are placed on.
pub const SWEEP_QUEUE: &str = "sweeps";

/// Arguments for each known job type, tagged by `job_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "job_type", rename_all = "snake_case")]
pub enum JobPayload {
    /// Send expiry reminders.
    CheckExpiringSubscriptions,
    /// Cancel stale pending subscriptions.
    CleanupExpiredPending {
        /// Overrides the configured timeout.
        #[serde(default)]
        hours: Option<i64>,
    },
    /// Suspend subscriptions whose grace period ended.
    SuspendExpiredGrace,
    /// Generate sessions from weekly templates.
    GenerateSessions {
        /// Overrides the configured horizon.
        #[serde(default)]
        weeks: Option<u32>,
    },
    /// Prepare meeting rooms for upcoming sessions.
    PrepareSessions {
        /// Re-prepare sessions that are already ready.
        #[serde(default)]
        force: bool,
    },
    /// Stop recordings past their scheduled end.
    StopExpiredRecordings,
}

impl JobPayload {
    /// The handler key stored in `jobs.job_type`.
    pub fn job_type(&self) -> &'static str {
        match self {
            Self::CheckExpiringSubscriptions => "check_expiring_subscriptions",
            Self::CleanupExpiredPending { .. } => "cleanup_expired_pending",
            Self::SuspendExpiredGrace => "suspend_expired_grace",
            Self::GenerateSessions { .. } => "generate_sessions",
            Self::PrepareSessions { .. } => "prepare_sessions",
            Self::StopExpiredRecordings => "stop_expired_recordings",
        }
    }

    /// All job types, for CLI help and validation.
    pub fn known_types() -> &'static [&'static str] {
        &[
            "check_expiring_subscriptions",
            "cleanup_expired_pending",
            "suspend_expired_grace",
            "generate_sessions",
            "prepare_sessions",
            "stop_expired_recordings",
        ]
    }

    /// Reject option values no task can run with.
    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            Self::CleanupExpiredPending { hours: Some(hours) } => {
                check_pending_timeout(*hours)?;
            }
            Self::GenerateSessions { weeks: Some(weeks) } => {
                check_generation_weeks(*weeks)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Rebuild a payload from a stored job row.
    pub fn from_job(job_type: &str, payload: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut tagged = match payload {
            serde_json::Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        tagged.insert(
            "job_type".to_string(),
            serde_json::Value::String(job_type.to_string()),
        );
        serde_json::from_value(serde_json::Value::Object(tagged))
    }

    /// Build the queue row for this payload.
    pub fn into_create_job(self, priority: JobPriority) -> Result<CreateJob, serde_json::Error> {
        let job_type = self.job_type().to_string();
        let mut payload = serde_json::to_value(&self)?;
        if let serde_json::Value::Object(map) = &mut payload {
            map.remove("job_type");
        }
        Ok(CreateJob {
            job_type,
            queue: SWEEP_QUEUE.to_string(),
            priority,
            payload,
            max_attempts: 3,
            scheduled_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_job_strips_tag() {
        let job = JobPayload::CleanupExpiredPending { hours: Some(24) }
            .into_create_job(JobPriority::High)
            .unwrap();
        assert_eq!(job.job_type, "cleanup_expired_pending");
        assert_eq!(job.payload, serde_json::json!({ "hours": 24 }));
        assert_eq!(job.queue, SWEEP_QUEUE);
    }

    #[test]
    fn test_from_job_with_empty_payload() {
        let payload =
            JobPayload::from_job("generate_sessions", &serde_json::json!({})).unwrap();
        assert_eq!(payload, JobPayload::GenerateSessions { weeks: None });

        let payload =
            JobPayload::from_job("prepare_sessions", &serde_json::Value::Null).unwrap();
        assert_eq!(payload, JobPayload::PrepareSessions { force: false });
    }

    #[test]
    fn test_unknown_job_type_is_rejected() {
        assert!(JobPayload::from_job("weekly_report", &serde_json::json!({})).is_err());
    }

    #[test]
    fn test_validate_option_bounds() {
        assert!(JobPayload::CleanupExpiredPending { hours: None }.validate().is_ok());
        assert!(JobPayload::CleanupExpiredPending { hours: Some(48) }.validate().is_ok());
        for hours in [0, -1, 4_000_000_000_000_000] {
            let err = JobPayload::CleanupExpiredPending { hours: Some(hours) }
                .validate()
                .unwrap_err();
            assert_eq!(err.kind, academy_core::error::ErrorKind::Validation);
        }

        assert!(JobPayload::GenerateSessions { weeks: Some(0) }.validate().is_err());
        assert!(JobPayload::GenerateSessions { weeks: Some(53) }.validate().is_err());
        assert!(JobPayload::GenerateSessions { weeks: Some(4) }.validate().is_ok());
        assert!(JobPayload::StopExpiredRecordings.validate().is_ok());
    }

    #[test]
    fn test_known_types_match_payloads() {
        for job_type in JobPayload::known_types() {
            let payload = JobPayload::from_job(job_type, &serde_json::json!({})).unwrap();
            assert_eq!(payload.job_type(), *job_type);
        }
    }
}
