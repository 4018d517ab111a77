//! Civil time to Julian Day (UT) conversion.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Julian Day of 2000-01-01 12:00 UT.
pub const J2000: f64 = 2_451_545.0;
/// Julian Day of the Unix epoch.
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeError {
    #[error("Invalid date: {field} = {value}")]
    InvalidDate { field: &'static str, value: String },
    #[error("Invalid timezone offset: {hours} hours")]
    InvalidOffset { hours: f64 },
}

/// Continuous astronomical time in days, UT based.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JulianDay(f64);

impl JulianDay {
    pub const J2000: JulianDay = JulianDay(J2000);

    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Julian centuries elapsed since J2000.
    pub fn centuries_since_j2000(self) -> f64 {
        (self.0 - J2000) / 36_525.0
    }

    pub fn plus_days(self, days: f64) -> Self {
        Self(self.0 + days)
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let seconds = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;
        Self(UNIX_EPOCH_JD + seconds / SECONDS_PER_DAY)
    }

    /// Inverse of [`JulianDay::from_datetime`], rounded to the millisecond.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let millis = ((self.0 - UNIX_EPOCH_JD) * SECONDS_PER_DAY * 1000.0).round();
        if !millis.is_finite() {
            return None;
        }
        Utc.timestamp_millis_opt(millis as i64).single()
    }
}

impl From<DateTime<Utc>> for JulianDay {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

/// Convert local civil time to Julian Day (UT).
///
/// The offset is subtracted first (local = UT + offset), then the proleptic Gregorian
/// day number formula is applied. Day roll-over from the offset is absorbed by the
/// continuous day count, so no calendar arithmetic is needed after validation.
pub fn to_julian_day(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: f64,
    timezone_offset_hours: f64,
) -> Result<JulianDay, TimeError> {
    if !(1..=12).contains(&month) {
        return Err(invalid("month", month));
    }
    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(invalid("day", day));
    }
    if hour > 23 {
        return Err(invalid("hour", hour));
    }
    if minute > 59 {
        return Err(invalid("minute", minute));
    }
    if !(0.0..60.0).contains(&second) {
        return Err(invalid("second", second));
    }
    if !timezone_offset_hours.is_finite() || timezone_offset_hours.abs() >= 24.0 {
        return Err(TimeError::InvalidOffset {
            hours: timezone_offset_hours,
        });
    }

    let ut_hours = f64::from(hour) + f64::from(minute) / 60.0 + second / 3600.0
        - timezone_offset_hours;
    Ok(JulianDay(
        julian_day_number(year, month, day) + (ut_hours - 12.0) / 24.0,
    ))
}

/// Julian Day from a UTC instant, going through the same calendar formula.
pub fn datetime_to_julian_day(dt: DateTime<Utc>) -> JulianDay {
    let second = f64::from(dt.second()) + f64::from(dt.nanosecond().min(999_999_999)) * 1e-9;
    let ut_hours = f64::from(dt.hour()) + f64::from(dt.minute()) / 60.0 + second / 3600.0;
    JulianDay(julian_day_number(dt.year(), dt.month(), dt.day()) + (ut_hours - 12.0) / 24.0)
}

/// Integer day number at noon for a proleptic Gregorian date.
fn julian_day_number(year: i32, month: u32, day: u32) -> f64 {
    let a = ((14.0 - f64::from(month)) / 12.0).floor();
    let y = f64::from(year) + 4800.0 - a;
    let m = f64::from(month) + 12.0 * a - 3.0;
    f64::from(day) + ((153.0 * m + 2.0) / 5.0).floor() + 365.0 * y + (y / 4.0).floor()
        - (y / 100.0).floor()
        + (y / 400.0).floor()
        - 32045.0
}

fn invalid(field: &'static str, value: impl ToString) -> TimeError {
    TimeError::InvalidDate {
        field,
        value: value.to_string(),
    }
}
