//! DATE and DATETIME parsing and rendering.
//!
//! Canonical values are `yyyyMMdd` for dates and `yyyyMMddHHmmZZZ`
//! (e.g. `202010051230-0500`) for date-times. Input is tried against several
//! patterns in a fixed order; the first one that parses wins.

use std::fmt::{Display, Write};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use hub_model::{HubError, Result, SchemaError, ValidationError};

use crate::formats::{DATE_PATTERN, DATETIME_PATTERN};
use crate::pattern::to_chrono_pattern;

const ISO_DATE: &str = "%Y-%m-%d";
/// ISO-8601 offset date-time without seconds, which RFC 3339 does not allow.
const ISO_DATETIME_MINUTES: &str = "%Y-%m-%dT%H:%M%:z";

fn chrono_pattern(element: &str, format: Option<&str>, canonical: &str) -> Result<String> {
    match format {
        None => Ok(canonical.to_string()),
        Some(pattern) => to_chrono_pattern(pattern).ok_or_else(|| {
            SchemaError::InvalidPattern {
                element: element.to_string(),
                pattern: pattern.to_string(),
            }
            .into()
        }),
    }
}

/// Whether `value` spells out every field of `pattern` at full width.
///
/// chrono reads `%m`, `%d`, `%H` and `%M` from one digit as well as two, so
/// `2020115` would parse under `%Y%m%d`. Fixed-width patterns must render the
/// parsed value back to the input. Patterns with `%-` fields are unpadded
/// and accept either width.
fn fills_pattern(value: &str, pattern: &str, parsed: impl Display) -> bool {
    if pattern.contains("%-") {
        return true;
    }
    let mut rendered = String::with_capacity(value.len());
    write!(rendered, "{parsed}").is_ok() && rendered.eq_ignore_ascii_case(value)
}

fn parse_date(value: &str, pattern: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, pattern)
        .ok()
        .filter(|date| fills_pattern(value, pattern, date.format(pattern)))
}

fn parse_datetime(value: &str, pattern: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, pattern)
        .ok()
        .filter(|datetime| fills_pattern(value, pattern, datetime.format(pattern)))
}

/// Parse a date, trying ISO-8601 first and then the declared pattern.
pub fn normalize_date(element: &str, value: &str, format: Option<&str>) -> Result<String> {
    if let Some(date) = parse_date(value, ISO_DATE) {
        return Ok(date.format(DATE_PATTERN).to_string());
    }
    let pattern = chrono_pattern(element, format, DATE_PATTERN)?;
    parse_date(value, &pattern)
        .map(|date| date.format(DATE_PATTERN).to_string())
        .ok_or_else(|| ValidationError::new(element, value, "invalid date").into())
}

pub fn format_date(element: &str, normalized: &str, format: Option<&str>) -> Result<String> {
    let Some(format) = format else {
        return Ok(normalized.to_string());
    };
    let pattern = chrono_pattern(element, Some(format), DATE_PATTERN)?;
    let date = NaiveDate::parse_from_str(normalized, DATE_PATTERN).map_err(|_| {
        HubError::internal(format!("'{normalized}' is not a canonical date for '{element}'"))
    })?;
    Ok(date.format(&pattern).to_string())
}

/// Parse a date-time.
///
/// Order: ISO-8601 with offset, the declared pattern with offset, a
/// canonical date at midnight in `zone`, the declared pattern read as a date
/// at midnight in `zone`.
pub fn normalize_datetime(
    element: &str,
    value: &str,
    format: Option<&str>,
    zone: Tz,
) -> Result<String> {
    let canonical = |datetime: DateTime<FixedOffset>| datetime.format(DATETIME_PATTERN).to_string();

    if let Some(datetime) = parse_iso_datetime(value) {
        return Ok(canonical(datetime));
    }
    let pattern = chrono_pattern(element, format, DATETIME_PATTERN)?;
    if let Some(datetime) = parse_datetime(value, &pattern) {
        return Ok(canonical(datetime));
    }
    if let Some(datetime) = parse_date(value, DATE_PATTERN).and_then(|date| midnight_in(date, zone))
    {
        return Ok(canonical(datetime));
    }
    parse_date(value, &pattern)
        .and_then(|date| midnight_in(date, zone))
        .map(canonical)
        .ok_or_else(|| ValidationError::new(element, value, "invalid date").into())
}

pub fn format_datetime(element: &str, normalized: &str, format: Option<&str>) -> Result<String> {
    let Some(format) = format else {
        return Ok(normalized.to_string());
    };
    let pattern = chrono_pattern(element, Some(format), DATETIME_PATTERN)?;
    let datetime = DateTime::parse_from_str(normalized, DATETIME_PATTERN).map_err(|_| {
        HubError::internal(format!(
            "'{normalized}' is not a canonical date-time for '{element}'"
        ))
    })?;
    Ok(datetime.format(&pattern).to_string())
}

fn parse_iso_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .or_else(|| parse_datetime(value, ISO_DATETIME_MINUTES))
}

/// Midnight of `date` in `zone`, with the offset in effect on that date.
fn midnight_in(date: NaiveDate, zone: Tz) -> Option<DateTime<FixedOffset>> {
    zone.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|datetime| datetime.fixed_offset())
}
