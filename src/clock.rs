//! Civil time evaluation from POSIX TZ rules.

use jiff::Timestamp;
use jiff::tz::TimeZone;
use tracing::warn;

/// Broken-down local time for one instant in one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub second: i8,
    pub minute: i8,
    pub hour: i8,
    /// ISO-8601 weekday, Monday = 1 .. Sunday = 7
    pub dow: i8,
    pub day: i8,
    pub month: i8,
    pub year: i16,
}

impl LocalTime {
    /// Evaluates `at` in the zone described by `posix_rule`.
    ///
    /// A rule that cannot be parsed is treated as UTC.
    pub fn at(at: Timestamp, posix_rule: &str) -> Self {
        let tz = TimeZone::posix(posix_rule).unwrap_or_else(|e| {
            warn!("time zone detect failed for {:?}: {}", posix_rule, e);
            TimeZone::UTC
        });
        let zoned = at.to_zoned(tz);

        Self {
            second: zoned.second(),
            minute: zoned.minute(),
            hour: zoned.hour(),
            dow: iso_weekday(zoned.weekday().to_sunday_zero_offset()),
            day: zoned.day(),
            month: zoned.month(),
            year: zoned.year(),
        }
    }
}

/// Remaps a Sunday = 0 weekday number to Sunday = 7.
fn iso_weekday(sunday_zero: i8) -> i8 {
    if sunday_zero == 0 { 7 } else { sunday_zero }
}
