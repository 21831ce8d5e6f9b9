//! Time-point parsing, formatting, and month arithmetic.
//!
//! All timestamps are UTC. GPX carries ISO-8601 `YYYY-MM-DDTHH:MM:SSZ`,
//! which is parsed and emitted through the RFC 3339 well-known format.

use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::{Error, Result};

/// Parses an ISO-8601 UTC timestamp.
pub fn parse_timestamp(s: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(s.trim(), &Rfc3339)
        .map_err(|e| Error::Parse(format!("bad timestamp '{s}': {e}")))
}

/// Formats a timestamp as ISO-8601 UTC.
pub fn format_timestamp(t: OffsetDateTime) -> String {
    t.format(&Rfc3339).unwrap_or_else(|_| "invalid".to_string())
}

/// Converts fractional unix seconds to a time point.
pub fn from_unix_seconds(secs: f64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos((secs * 1e9) as i128)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Converts a time point to fractional unix seconds.
pub fn to_unix_seconds(t: OffsetDateTime) -> f64 {
    t.unix_timestamp_nanos() as f64 / 1e9
}

/// Rounds a time point down to the first day of its month, midnight UTC.
/// Months are 1..12.
pub fn round_to_month(t: OffsetDateTime) -> OffsetDateTime {
    let first = Date::from_calendar_date(t.year(), t.month(), 1).unwrap_or(t.date());
    PrimitiveDateTime::new(first, Time::MIDNIGHT).assume_utc()
}

/// Formats a duration in seconds as `h, m, s`, omitting leading zero
/// components. Sub-second remainders are rounded to whole seconds.
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;

    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parse_and_format_round_trip() {
        let t = parse_timestamp("2021-06-05T14:30:00Z").unwrap();
        assert_eq!(t, datetime!(2021-06-05 14:30:00 UTC));
        assert_eq!(format_timestamp(t), "2021-06-05T14:30:00Z");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("2021-13-01T00:00:00Z").is_err());
    }

    #[test]
    fn unix_seconds_round_trip() {
        let t = datetime!(2020-02-29 23:59:59 UTC);
        let secs = to_unix_seconds(t);
        assert_eq!(from_unix_seconds(secs), t);
    }

    #[test]
    fn month_rounding() {
        let t = datetime!(2021-06-05 14:30:00 UTC);
        assert_eq!(round_to_month(t), datetime!(2021-06-01 00:00:00 UTC));
        // Already at the month start: unchanged.
        let first = datetime!(2021-12-01 00:00:00 UTC);
        assert_eq!(round_to_month(first), first);
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(42.0), "42s");
        assert_eq!(format_duration(154.0), "2m 34s");
        assert_eq!(format_duration(3723.0), "1h 2m 3s");
        assert_eq!(format_duration(0.0), "0s");
    }
}
