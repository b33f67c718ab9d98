use chrono::{
    DateTime,
    Duration,
    NaiveDate,
    NaiveTime,
    Utc
};

/// KST is UTC+9 with no daylight saving.
pub const KST_OFFSET_HOURS: i64 = 9;

/// Civil date in Korea for the given instant.
///
/// The host timezone is never consulted: the offset is applied to the UTC
/// instant directly, so a machine configured for any zone gets the same answer.
pub fn to_kst_date(instant: DateTime<Utc>) -> NaiveDate {
    (instant.naive_utc() + Duration::hours(KST_OFFSET_HOURS)).date()
}

pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    fn today_kst(&self) -> NaiveDate {
        to_kst_date(self.now_utc())
    }
}

#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> FixedClock {
        FixedClock { instant }
    }

    /// Frozen at KST midnight of `d`.
    pub fn at_kst_date(d: NaiveDate) -> FixedClock {
        let utc = d.and_time(NaiveTime::MIN) - Duration::hours(KST_OFFSET_HOURS);
        FixedClock { instant: utc.and_utc() }
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_kst_rolls_over_before_utc() {
        // 2023-12-31 15:00 UTC is already 2024-01-01 in Seoul
        let instant = Utc.with_ymd_and_hms(2023, 12, 31, 15, 0, 0).unwrap();
        assert_eq!(to_kst_date(instant), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let instant = Utc.with_ymd_and_hms(2023, 12, 31, 14, 59, 59).unwrap();
        assert_eq!(to_kst_date(instant), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_fixed_clock_at_kst_date() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let clock = FixedClock::at_kst_date(d);
        assert_eq!(clock.today_kst(), d);
        assert_eq!(clock.instant(), Utc.with_ymd_and_hms(2024, 1, 14, 15, 0, 0).unwrap());
    }
}
