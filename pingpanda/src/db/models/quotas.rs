//! Database models for monthly quotas.

use crate::types::{QuotaId, UserId};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

/// Calendar month a quota counter belongs to.
///
/// `month` is 1-based (January = 1), matching the `quotas.month` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuotaPeriod {
    pub month: i32,
    pub year: i32,
}

impl QuotaPeriod {
    /// The period containing `at` (UTC)
    pub fn containing(at: DateTime<Utc>) -> Self {
        Self {
            month: at.month() as i32,
            year: at.year(),
        }
    }

    /// First instant of this period
    pub fn starts_at(&self) -> DateTime<Utc> {
        first_instant_of(self.year, self.month)
    }

    /// First instant of the following period, i.e. when the counter resets
    pub fn resets_at(&self) -> DateTime<Utc> {
        if self.month == 12 {
            first_instant_of(self.year + 1, 1)
        } else {
            first_instant_of(self.year, self.month + 1)
        }
    }
}

fn first_instant_of(year: i32, month: i32) -> DateTime<Utc> {
    let date = NaiveDate::from_ymd_opt(year, month as u32, 1).unwrap_or(NaiveDate::MIN);
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// Database response for a quota row
#[derive(Debug, Clone)]
pub struct QuotaDBResponse {
    pub id: QuotaId,
    pub user_id: UserId,
    pub month: i32,
    pub year: i32,
    pub count: i32,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_is_one_based() {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(QuotaPeriod::containing(at), QuotaPeriod { month: 1, year: 2025 });
    }

    #[test]
    fn test_resets_at_first_of_next_month() {
        let period = QuotaPeriod::containing(Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap());
        assert_eq!(period.starts_at(), Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(period.resets_at(), Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_resets_at_rolls_over_year() {
        let period = QuotaPeriod::containing(Utc.with_ymd_and_hms(2024, 12, 3, 8, 0, 0).unwrap());
        assert_eq!(period.resets_at(), Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }
}
