//! Julian dates and Greenwich Mean Sidereal Time

use chrono::{DateTime, Timelike, Utc};
use std::f64::consts::PI;

pub const SECONDS_PER_DAY: f64 = 86400.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36525.0;

/// Julian date of the Unix epoch (1970-01-01T00:00:00Z)
pub const JD_UNIX_EPOCH: f64 = 2440587.5;
/// Julian date of J2000.0 (2000-01-01T12:00:00 TT, treated as UTC here)
pub const JD_J2000: f64 = 2451545.0;

/// Julian date split into the midnight day number and the fraction of day,
/// the same split SGP4 implementations use to keep precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JulianDate {
    /// Julian day number at 0h UTC (always ends in .5)
    pub day: f64,
    /// Fraction of the UTC day in [0, 1)
    pub fraction: f64,
}

impl JulianDate {
    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        let days_since_unix = time.timestamp().div_euclid(86_400);
        let seconds_of_day = time.num_seconds_from_midnight() as f64
            + time.nanosecond().min(999_999_999) as f64 * 1e-9;

        Self {
            day: days_since_unix as f64 + JD_UNIX_EPOCH,
            fraction: seconds_of_day / SECONDS_PER_DAY,
        }
    }

    /// Julian centuries elapsed since J2000.0
    pub fn centuries_since_j2000(&self) -> f64 {
        ((self.day - JD_J2000) + self.fraction) / DAYS_PER_JULIAN_CENTURY
    }
}

/// GMST (IAU 1982) in radians, normalized to [0, 2π)
pub fn gmst(time: DateTime<Utc>) -> f64 {
    let t = JulianDate::from_datetime(time).centuries_since_j2000();

    // GMST in seconds of time
    let gmst_sec = 67310.54841
        + (876600.0 * 3600.0 + 8640184.812866) * t
        + 0.093104 * t * t
        - 6.2e-6 * t * t * t;

    // 240 seconds of time per degree
    (gmst_sec / 240.0).to_radians().rem_euclid(2.0 * PI)
}
