//! Recurring weekly schedule template.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use academy_core::types::{AcademyId, SubscriptionId, TemplateId};

use super::model::NewSession;
use super::status::SessionKind;

/// A weekly slot from which concrete sessions are generated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduleTemplate {
    /// Unique template identifier.
    pub id: TemplateId,
    /// Owning academy.
    pub academy_id: AcademyId,
    /// Subscription the generated sessions belong to.
    pub subscription_id: Option<SubscriptionId>,
    /// Kind of the generated sessions.
    pub kind: SessionKind,
    /// Day of week, 0 = Monday.
    pub weekday: i16,
    /// Start time of day (UTC).
    pub start_time: NaiveTime,
    /// Length of every generated session.
    pub duration_minutes: i32,
    /// First day the template applies.
    pub starts_on: NaiveDate,
    /// Last day the template applies, inclusive.
    pub ends_on: Option<NaiveDate>,
    /// Inactive templates generate nothing.
    pub is_active: bool,
    /// When the template was created.
    pub created_at: DateTime<Utc>,
}

impl ScheduleTemplate {
    fn applies_on(&self, day: NaiveDate) -> bool {
        day.weekday().num_days_from_monday() as i16 == self.weekday
            && day >= self.starts_on
            && self.ends_on.is_none_or(|end| day <= end)
    }

    /// Slot start times strictly after `from` and within `weeks` weeks of it.
    ///
    /// Pure and ordered, so generating twice over the same horizon yields the
    /// same slots.
    pub fn occurrences(&self, from: DateTime<Utc>, weeks: u32) -> Vec<DateTime<Utc>> {
        if !self.is_active || weeks == 0 {
            return Vec::new();
        }

        let first = from.date_naive();
        let horizon = from + Duration::weeks(weeks as i64);

        (0..=(weeks as i64 * 7))
            .filter_map(|offset| first.checked_add_signed(Duration::days(offset)))
            .filter(|day| self.applies_on(*day))
            .map(|day| day.and_time(self.start_time).and_utc())
            .filter(|at| *at > from && *at <= horizon)
            .collect()
    }

    /// Build the session row for one occurrence.
    pub fn to_new_session(&self, scheduled_at: DateTime<Utc>) -> NewSession {
        NewSession {
            academy_id: self.academy_id,
            kind: self.kind,
            subscription_id: self.subscription_id,
            template_id: Some(self.id),
            scheduled_at,
            duration_minutes: Some(self.duration_minutes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn template(weekday: i16) -> ScheduleTemplate {
        ScheduleTemplate {
            id: TemplateId::new(),
            academy_id: AcademyId::new(),
            subscription_id: None,
            kind: SessionKind::Quran,
            weekday,
            start_time: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
            duration_minutes: 45,
            starts_on: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            ends_on: None,
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_one_occurrence_per_week() {
        // 2025-05-05 is a Monday.
        let from = Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap();
        let slots = template(2).occurrences(from, 4);
        assert_eq!(slots.len(), 4);
        assert!(slots.iter().all(|s| s.weekday().num_days_from_monday() == 2));
        assert_eq!(slots[0], Utc.with_ymd_and_hms(2025, 5, 7, 17, 30, 0).unwrap());
    }

    #[test]
    fn test_past_slot_today_is_skipped() {
        let from = Utc.with_ymd_and_hms(2025, 5, 5, 18, 0, 0).unwrap();
        let slots = template(0).occurrences(from, 2);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0], Utc.with_ymd_and_hms(2025, 5, 12, 17, 30, 0).unwrap());
    }

    #[test]
    fn test_respects_bounds_and_activity() {
        let from = Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap();
        let mut t = template(0);
        t.ends_on = NaiveDate::from_ymd_opt(2025, 5, 12);
        assert_eq!(t.occurrences(from, 4).len(), 2);

        t.is_active = false;
        assert!(t.occurrences(from, 4).is_empty());
    }

    #[test]
    fn test_occurrences_are_stable() {
        let from = Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap();
        let t = template(4);
        assert_eq!(t.occurrences(from, 3), t.occurrences(from, 3));
    }
}
