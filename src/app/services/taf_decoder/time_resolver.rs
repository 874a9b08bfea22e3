//! Day/hour/minute resolution against a reference time
//!
//! TAF timestamps carry only day-of-month, hour and minute. The year and month
//! come from the reference time: if the day is within ten days of the
//! reference day the reference month is used, otherwise the month boundary is
//! assumed crossed (an earlier day means next month, a later day means the
//! previous month).
//!
//! Instants are built by adding the day/hour/minute as durations onto the
//! first of the resolved month, so out-of-range values normalize the way
//! epoch arithmetic does: hour 24 of day 26 is 00Z on day 27, and day 31 of a
//! 30-day month is the 1st of the following month.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use super::error::DecodeError;

/// Days of separation beyond which a month boundary is assumed crossed
const MONTH_ROLLOVER_DAYS: i64 = 10;

/// Resolves partial TAF timestamps against one reference instant
#[derive(Debug, Clone, Copy)]
pub struct TimeResolver {
    reference: DateTime<Utc>,
}

impl TimeResolver {
    pub fn new(reference: DateTime<Utc>) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    /// Resolve a day/hour/minute triple into an absolute UTC instant
    pub fn resolve(&self, day: u32, hour: u32, minute: u32) -> Result<DateTime<Utc>, DecodeError> {
        let invalid = DecodeError::InvalidTime { day, hour, minute };
        if !(1..=31).contains(&day) || hour > 24 || minute > 59 {
            return Err(invalid);
        }

        let (year, month) = self.resolve_month(day);
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or(invalid)?;

        let instant = first
            + Duration::days(i64::from(day) - 1)
            + Duration::hours(i64::from(hour))
            + Duration::minutes(i64::from(minute));
        Ok(Utc.from_utc_datetime(&instant))
    }

    /// Day of month 24 hours after `day` 00Z of the reference month
    pub fn increment_day(&self, day: u32) -> Result<u32, DecodeError> {
        let invalid = DecodeError::InvalidTime {
            day,
            hour: 0,
            minute: 0,
        };
        if !(1..=31).contains(&day) {
            return Err(invalid);
        }
        let first = NaiveDate::from_ymd_opt(self.reference.year(), self.reference.month(), 1)
            .ok_or(invalid)?;
        Ok((first + Duration::days(i64::from(day))).day())
    }

    fn resolve_month(&self, day: u32) -> (i32, u32) {
        let ref_year = self.reference.year();
        let ref_month = self.reference.month();
        let ref_day = i64::from(self.reference.day());
        let day = i64::from(day);

        if (day - ref_day).abs() < MONTH_ROLLOVER_DAYS {
            (ref_year, ref_month)
        } else if day < ref_day {
            if ref_month == 12 {
                (ref_year + 1, 1)
            } else {
                (ref_year, ref_month + 1)
            }
        } else if ref_month == 1 {
            (ref_year - 1, 12)
        } else {
            (ref_year, ref_month - 1)
        }
    }
}
