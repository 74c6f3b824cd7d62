use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{GenQuakemlError, Result};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Canonical instant representation used in the record and in QuakeML
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Parse a full instant: RFC 3339, or a naive date-time taken as UTC
pub fn parse_instant(field: &str, raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let naive = raw.trim_end_matches(['Z', 'z']);
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .map(|dt| dt.and_utc())
        .ok_or_else(|| {
            GenQuakemlError::validation(field, format!("'{}' is not a valid timestamp", raw))
        })
}

pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| {
            GenQuakemlError::validation(field, format!("'{}' is not a valid calendar date", raw))
        })
}

pub fn parse_time_of_day(field: &str, raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim().trim_end_matches(['Z', 'z']);
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| {
            GenQuakemlError::validation(field, format!("'{}' is not a valid time of day", raw))
        })
}

/// Combine separate date and time components into one UTC instant
pub fn compose_instant(
    date_field: &str,
    date: &str,
    time_field: &str,
    time: &str,
) -> Result<DateTime<Utc>> {
    let date = parse_date(date_field, date)?;
    let time = parse_time_of_day(time_field, time)?;
    Ok(date.and_time(time).and_utc())
}
