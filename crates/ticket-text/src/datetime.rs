//! Date and time canonicalization

use crate::{Result, TextError};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Display format for dates (e.g., "15 Mar 2025")
pub const DATE_DISPLAY_FORMAT: &str = "%d %b %Y";

/// Display format for times (e.g., "09:30 AM")
pub const TIME_DISPLAY_FORMAT: &str = "%I:%M %p";

/// Date-only layouts, tried in order. Numeric layouts are day-first.
const DATE_LAYOUTS: [&str; 10] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    DATE_DISPLAY_FORMAT,
    "%d-%b-%Y",
    "%d %b, %Y",
    "%b %d, %Y",
    "%b %d %Y",
];

/// Date-time layouts without an offset; only the date part is kept
const DATETIME_LAYOUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const TIME_LAYOUTS: [&str; 6] = [
    TIME_DISPLAY_FORMAT,
    "%I:%M%p",
    "%I:%M:%S %p",
    "%I:%M:%S%p",
    "%H:%M",
    "%H:%M:%S",
];

/// Separators accepted between the two ends of a time range
const RANGE_SEPARATORS: [&str; 4] = ["–", "—", " TO ", "-"];

/// Spreadsheet serials accepted as dates
const SERIAL_RANGE: std::ops::RangeInclusive<i64> = 10_000..=100_000;

/// Years outside this window are treated as parse failures (e.g. "15/03/25")
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1900..=2199;

/// Parse a date written in any of the accepted layouts
///
/// Accepts RFC 3339 timestamps (the date in the timestamp's own offset),
/// ISO dates and date-times, day-first numeric dates, month-name dates,
/// compact `YYYYMMDD` and spreadsheet serial day numbers.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let text = raw.trim();
    let invalid = || TextError::InvalidDate(text.to_string());

    if text.is_empty() {
        return Err(invalid());
    }

    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| {
            DATETIME_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DATE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDate::parse_from_str(text, layout).ok())
        })
        .or_else(|| parse_numeric_date(text));

    match parsed {
        Some(date) if PLAUSIBLE_YEARS.contains(&chrono::Datelike::year(&date)) => Ok(date),
        _ => Err(invalid()),
    }
}

/// Handle all-digit input: `YYYYMMDD` or a spreadsheet serial number
fn parse_numeric_date(text: &str) -> Option<NaiveDate> {
    if !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    if text.len() == 8 {
        return NaiveDate::parse_from_str(text, "%Y%m%d").ok();
    }

    // 1900 date system: serial 1 is 1900-01-01, anchored at 1899-12-30 so
    // that serials past the phantom 1900-02-29 land on the right day.
    // Serials start at 10000 (1927-05-18) so a bare year is never read as one.
    let serial: i64 = text.parse().ok()?;
    if !SERIAL_RANGE.contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial))
}

/// Canonicalize a date to [`DATE_DISPLAY_FORMAT`]
///
/// Idempotent: formatting an already formatted date returns it unchanged.
pub fn format_date(raw: &str) -> Result<String> {
    parse_date(raw).map(|date| date.format(DATE_DISPLAY_FORMAT).to_string())
}

/// Canonicalize a date, falling back to the trimmed input
pub fn display_date(raw: &str) -> String {
    format_date(raw).unwrap_or_else(|_| raw.trim().to_string())
}

/// Parse a single time of day
pub fn parse_time(raw: &str) -> Result<NaiveTime> {
    let text = normalize_time(raw);
    let invalid = || TextError::InvalidTime(raw.trim().to_string());

    if text.is_empty() {
        return Err(invalid());
    }

    TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveTime::parse_from_str(&text, layout).ok())
        .or_else(|| {
            // "9 AM" carries no minutes, which chrono refuses to parse
            let padded = hour_only(&text)?;
            NaiveTime::parse_from_str(&padded, TIME_DISPLAY_FORMAT).ok()
        })
        .ok_or_else(invalid)
}

/// Canonicalize a time or a time range to [`TIME_DISPLAY_FORMAT`]
///
/// Ranges ("10:00 - 13:00", "10 am to 1 pm") render as
/// "10:00 AM - 01:00 PM".
pub fn format_time(raw: &str) -> Result<String> {
    let text = normalize_time(raw);

    for separator in RANGE_SEPARATORS {
        if let Some((start, end)) = text.split_once(separator) {
            let start = parse_time(start)?;
            let end = parse_time(end)?;
            return Ok(format!(
                "{} - {}",
                start.format(TIME_DISPLAY_FORMAT),
                end.format(TIME_DISPLAY_FORMAT)
            ));
        }
    }

    parse_time(&text).map(|time| time.format(TIME_DISPLAY_FORMAT).to_string())
}

/// Canonicalize a time, falling back to the trimmed input
pub fn display_time(raw: &str) -> String {
    format_time(raw).unwrap_or_else(|_| raw.trim().to_string())
}

fn normalize_time(raw: &str) -> String {
    raw.trim()
        .to_ascii_uppercase()
        .replace("A.M.", "AM")
        .replace("P.M.", "PM")
        .replace(" HRS", "")
}

fn hour_only(text: &str) -> Option<String> {
    if text.contains(':') {
        return None;
    }
    let split = text.find(|c: char| c.is_ascii_alphabetic())?;
    let (hour, suffix) = text.split_at(split);
    if hour.trim().is_empty() {
        return None;
    }
    Some(format!("{}:00 {}", hour.trim(), suffix.trim()))
}
