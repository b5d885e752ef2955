//! Timestamp parsing and calendar helpers.
//!
//! Timestamps arrive as loosely formatted text. Parsing never fails loudly:
//! anything unreadable yields `None`, and callers treat `None` as "outside
//! every date window".

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a timestamp into an instant.
///
/// * RFC 3339 (`2024-05-01T10:00:00Z`, `...+05:30`) is taken as is.
/// * Date-times without an offset are wall-clock time in `tz`.
/// * A bare date (`2024-05-01`) is midnight UTC, the way the CRM frontend reads it.
pub fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

/// Calendar date of a due-date field.
///
/// A bare date is its own calendar day (no timezone shift); a full timestamp is
/// converted to `tz` first.
pub fn parse_calendar_date<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(d);
    }
    parse_timestamp(s, tz).map(|dt| dt.with_timezone(tz).date_naive())
}

/// First instant of `date` in `tz`. When midnight falls into a DST gap the
/// first existing hour of that morning is used.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    (0..3).find_map(|hour| {
        let time = NaiveTime::from_hms_opt(hour, 0, 0)?;
        tz.from_local_datetime(&date.and_time(time)).earliest()
    })
}

/// Most recent Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Short chart label, e.g. `Dec 31`.
pub fn short_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Numeric US-style date, e.g. `5/2/2024`.
pub fn numeric_label(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 1800).unwrap()
    }

    #[test]
    fn parses_rfc3339() {
        let dt = parse_timestamp("2024-05-01T10:00:00+05:30", &Utc).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-05-01T04:30:00+00:00");
    }

    #[test]
    fn naive_datetime_is_local_wall_clock() {
        let dt = parse_timestamp("2024-05-01T10:00:00", &ist()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-05-01T04:30:00+00:00");
        let spaced = parse_timestamp("2024-05-01 10:00", &ist()).unwrap();
        assert_eq!(dt, spaced);
    }

    #[test]
    fn bare_date_is_utc_midnight() {
        let dt = parse_timestamp("2024-05-01", &ist()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-05-01T00:00:00+00:00");
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_timestamp("", &Utc).is_none());
        assert!(parse_timestamp("yesterday-ish", &Utc).is_none());
        assert!(parse_timestamp("2024-13-45", &Utc).is_none());
    }

    #[test]
    fn calendar_date_keeps_bare_dates() {
        let d = parse_calendar_date("2024-05-01", &FixedOffset::west_opt(8 * 3600).unwrap());
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 5, 1));
        let late = parse_calendar_date("2024-05-01T20:00:00Z", &ist());
        assert_eq!(late, NaiveDate::from_ymd_opt(2024, 5, 2));
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-05-01 was a Wednesday.
        let wed = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(week_start(wed), NaiveDate::from_ymd_opt(2024, 4, 28).unwrap());
        let sun = NaiveDate::from_ymd_opt(2024, 4, 28).unwrap();
        assert_eq!(week_start(sun), sun);
    }

    #[test]
    fn labels() {
        let d = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(short_label(d), "Dec 31");
        assert_eq!(numeric_label(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()), "5/2/2024");
        assert_eq!(month_start(d), NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
    }
}
