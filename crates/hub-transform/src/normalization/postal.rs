//! POSTAL_CODE values.

use std::sync::LazyLock;

use hub_model::{Result, ValidationError};
use regex::Regex;

use crate::formats::{US_ZIP_FORMAT, ZIP_FIVE_PLUS_FOUR_TOKEN, ZIP_FIVE_TOKEN};

/// Any postal code format in common use: letters, digits, dashes and spaces.
static POSTAL_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\d\- ]{3,12}$").expect("Invalid postal code regex"));

static US_ZIP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(US_ZIP_FORMAT).expect("Invalid US zip regex"));

pub fn normalize_postal_code(element: &str, value: &str) -> Result<String> {
    if !POSTAL_CODE_REGEX.is_match(value) {
        return Err(ValidationError::new(element, value, "invalid postal code").into());
    }
    Ok(value.replace(' ', ""))
}

/// Project a US zip to 5 or 5+4 digits; anything else passes through.
pub fn format_postal_code(normalized: &str, format: Option<&str>) -> String {
    let Some(captures) = US_ZIP_REGEX.captures(normalized) else {
        return normalized.to_string();
    };
    let five = captures.get(1).map_or("", |m| m.as_str());
    match format {
        Some(ZIP_FIVE_TOKEN) => five.to_string(),
        Some(ZIP_FIVE_PLUS_FOUR_TOKEN) => match captures.get(2) {
            Some(four) => format!("{five}-{}", four.as_str()),
            None => five.to_string(),
        },
        _ => normalized.to_string(),
    }
}
