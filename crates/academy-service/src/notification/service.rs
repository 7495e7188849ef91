//! In-app notification housekeeping.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use academy_core::error::AppError;
use academy_core::result::AppResult;
use academy_database::traits::NotificationRepository;

/// Which notifications a purge removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeSelector {
    /// Every notification.
    All,
    /// Notifications created strictly before the cutoff.
    Before(DateTime<Utc>),
}

impl PurgeSelector {
    /// Build a selector from CLI flags. Exactly one must be given.
    pub fn from_flags(all: bool, before: Option<DateTime<Utc>>) -> AppResult<Self> {
        match (all, before) {
            (true, None) => Ok(Self::All),
            (false, Some(cutoff)) => Ok(Self::Before(cutoff)),
            (true, Some(_)) => Err(AppError::validation(
                "--all and --before cannot be combined",
            )),
            (false, None) => Err(AppError::validation(
                "Refusing to purge without a selector; pass --all or --before",
            )),
        }
    }

    fn cutoff(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::Before(cutoff) => Some(*cutoff),
        }
    }
}

/// Counts and deletes in-app notifications.
#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// How many notifications `selector` matches.
    pub async fn count(&self, selector: PurgeSelector) -> AppResult<u64> {
        self.notifications.count(selector.cutoff()).await
    }

    /// Delete what `selector` matches and return the number removed.
    pub async fn purge(&self, selector: PurgeSelector) -> AppResult<u64> {
        let removed = self.notifications.purge(selector.cutoff()).await?;
        info!(removed, selector = ?selector, "Notifications purged");
        Ok(removed)
    }
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::error::ErrorKind;
    use chrono::TimeZone;

    #[test]
    fn test_selector_requires_exactly_one_flag() {
        let cutoff = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(PurgeSelector::from_flags(true, None).unwrap(), PurgeSelector::All);
        assert_eq!(
            PurgeSelector::from_flags(false, Some(cutoff)).unwrap(),
            PurgeSelector::Before(cutoff)
        );
        assert_eq!(
            PurgeSelector::from_flags(false, None).unwrap_err().kind,
            ErrorKind::Validation
        );
        assert_eq!(
            PurgeSelector::from_flags(true, Some(cutoff)).unwrap_err().kind,
            ErrorKind::Validation
        );
    }
}
