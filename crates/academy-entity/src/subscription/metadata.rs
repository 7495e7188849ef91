//! Typed view over the subscription `metadata` JSONB column.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use academy_core::error::AppError;

/// Key under which the grace deadline is stored in the metadata column.
pub const GRACE_PERIOD_KEY: &str = "grace_period_ends_at";

/// Subscription metadata.
///
/// The grace deadline is a typed field; every other key round-trips
/// untouched through `extra` so the stored JSON keeps its shape. A deadline
/// that cannot be read as a timestamp stays in `extra` as-is and the field
/// is left empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubscriptionMetadata {
    /// Deadline of an admin-granted payment grace window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period_ends_at: Option<DateTime<Utc>>,
    /// Keys this crate does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for SubscriptionMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut extra = Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default();

        let grace_period_ends_at = match extra.remove(GRACE_PERIOD_KEY) {
            None | Some(Value::Null) => None,
            Some(raw) => match parse_deadline(&raw) {
                Some(deadline) => Some(deadline),
                None => {
                    tracing::warn!(value = %raw, "Unreadable grace deadline left untouched");
                    extra.insert(GRACE_PERIOD_KEY.to_string(), raw);
                    None
                }
            },
        };

        Ok(Self {
            grace_period_ends_at,
            extra,
        })
    }
}

/// RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS` taken as UTC.
fn parse_deadline(raw: &Value) -> Option<DateTime<Utc>> {
    let text = raw.as_str()?.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

impl SubscriptionMetadata {
    /// Open a grace window. Only one may be outstanding at a time.
    pub fn grant_grace(&mut self, until: DateTime<Utc>) -> Result<(), AppError> {
        if let Some(existing) = self.grace_period_ends_at {
            return Err(AppError::conflict(format!(
                "A grace period is already outstanding until {}",
                existing.to_rfc3339()
            )));
        }
        if self.has_unreadable_grace() {
            return Err(AppError::conflict(
                "An unreadable grace deadline is already stored",
            ));
        }
        self.grace_period_ends_at = Some(until);
        Ok(())
    }

    /// Consume the grace window, returning the deadline that was set.
    pub fn clear_grace(&mut self) -> Option<DateTime<Utc>> {
        self.extra.remove(GRACE_PERIOD_KEY);
        self.grace_period_ends_at.take()
    }

    /// Whether the grace key holds a value that is not a timestamp.
    pub fn has_unreadable_grace(&self) -> bool {
        self.extra.contains_key(GRACE_PERIOD_KEY)
    }

    /// Whether a grace deadline exists and lies strictly before `as_of`.
    pub fn grace_expired(&self, as_of: DateTime<Utc>) -> bool {
        self.grace_period_ends_at
            .map(|deadline| deadline < as_of)
            .unwrap_or(false)
    }
}
