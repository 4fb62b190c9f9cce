//! Recurrence frequencies and schedule arithmetic.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use questline_core::error::DomainError;

/// How often a recurring quest regenerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceFrequency {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// The occurrence after `from`. Monthly steps keep the day of month,
    /// clamped to the last day of shorter months. `None` on calendar overflow.
    #[must_use]
    pub fn step(self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Daily => from.checked_add_signed(Duration::days(1)),
            Self::Weekly => from.checked_add_signed(Duration::days(7)),
            Self::Monthly => from.checked_add_months(Months::new(1)),
        }
    }
}

impl fmt::Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrenceFrequency {
    type Err = DomainError;

    /// Accepts any casing and surrounding whitespace.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(DomainError::Validation(format!(
                "invalid recurrence frequency {other:?}"
            ))),
        }
    }
}

/// First occurrence strictly after `now`, stepping from the previously
/// scheduled time (or from `now` when nothing was scheduled). Missed
/// occurrences are skipped, not replayed.
#[must_use]
pub fn advance_next_occurrence(
    scheduled: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    frequency: RecurrenceFrequency,
) -> Option<DateTime<Utc>> {
    let mut next = frequency.step(scheduled.unwrap_or(now))?;
    while next <= now {
        next = frequency.step(next)?;
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        assert_eq!(" Weekly\n".parse::<RecurrenceFrequency>().unwrap(), RecurrenceFrequency::Weekly);
        assert_eq!("DAILY".parse::<RecurrenceFrequency>().unwrap(), RecurrenceFrequency::Daily);
    }

    #[test]
    fn test_parse_rejects_unknown_frequency() {
        let err = "fortnightly".parse::<RecurrenceFrequency>().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("fortnightly")));
    }

    #[test]
    fn test_daily_step_from_due_time() {
        let now = at(2026, 1, 15, 10);
        let next = advance_next_occurrence(Some(at(2026, 1, 15, 9)), now, RecurrenceFrequency::Daily);
        assert_eq!(next, Some(at(2026, 1, 16, 9)));
    }

    #[test]
    fn test_three_missed_intervals_land_on_first_slot_after_now() {
        // Arrange
        let scheduled = at(2026, 1, 1, 8);
        let now = at(2026, 1, 22, 10);

        // Act
        let next = advance_next_occurrence(Some(scheduled), now, RecurrenceFrequency::Weekly);

        // Assert
        assert_eq!(next, Some(at(2026, 1, 29, 8)));
    }

    #[test]
    fn test_unscheduled_quest_steps_from_now() {
        let now = at(2026, 1, 15, 10);
        let next = advance_next_occurrence(None, now, RecurrenceFrequency::Weekly);
        assert_eq!(next, Some(at(2026, 1, 22, 10)));
    }

    #[test]
    fn test_occurrence_exactly_at_now_is_not_reused() {
        let now = at(2026, 1, 15, 10);
        let next = advance_next_occurrence(Some(at(2026, 1, 14, 10)), now, RecurrenceFrequency::Daily);
        assert_eq!(next, Some(at(2026, 1, 16, 10)));
    }

    #[test]
    fn test_monthly_step_clamps_to_month_end() {
        let next = RecurrenceFrequency::Monthly.step(at(2026, 1, 31, 12));
        assert_eq!(next, Some(at(2026, 2, 28, 12)));
    }

    #[test]
    fn test_monthly_advance_catches_up() {
        let now = at(2026, 5, 20, 0);
        let next = advance_next_occurrence(Some(at(2026, 2, 10, 6)), now, RecurrenceFrequency::Monthly);
        assert_eq!(next, Some(at(2026, 6, 10, 6)));
    }
}
