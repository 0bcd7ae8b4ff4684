//! TELEPHONE values.
//!
//! The canonical form is `national:country:extension`, with the national
//! number left-padded to 10 digits and an empty extension when there is none.

use hub_model::{HubError, Result, ValidationError};
use phonenumber::country;

use crate::formats::{
    AREA_CODE_TOKEN, COUNTRY_CODE_TOKEN, DEFAULT_PHONE_FORMAT, EXCHANGE_TOKEN, EXTENSION_TOKEN,
    PHONE_DELIMITER, SUBSCRIBER_TOKEN,
};

const MAX_NATIONAL_NUMBER: u64 = 9_999_999_999;

/// Parse a phone number as dialled from the US.
pub fn normalize_telephone(element: &str, value: &str) -> Result<String> {
    let number = phonenumber::parse(Some(country::Id::US), value)
        .map_err(|error| ValidationError::new(element, value, error.to_string()))?;
    let national = number.national().value();
    if national == 0 || national > MAX_NATIONAL_NUMBER {
        return Err(ValidationError::new(element, value, "invalid phone number").into());
    }
    let extension = number
        .extension()
        .map(|extension| extension.to_string())
        .unwrap_or_default();
    Ok(format!(
        "{national:010}{PHONE_DELIMITER}{}{PHONE_DELIMITER}{extension}",
        number.code().value()
    ))
}

/// Substitute the parts of a canonical number into `format`.
pub fn format_telephone(element: &str, normalized: &str, format: Option<&str>) -> Result<String> {
    let parts: Vec<&str> = normalized.split(PHONE_DELIMITER).collect();
    let [national, country, extension] = parts.as_slice() else {
        return Err(corrupt(element, normalized));
    };
    if national.len() != 10 || !national.bytes().all(|b| b.is_ascii_digit()) {
        return Err(corrupt(element, normalized));
    }
    Ok(format
        .unwrap_or(DEFAULT_PHONE_FORMAT)
        .replace(COUNTRY_CODE_TOKEN, country)
        .replace(AREA_CODE_TOKEN, &national[..3])
        .replace(EXCHANGE_TOKEN, &national[3..6])
        .replace(SUBSCRIBER_TOKEN, &national[6..])
        .replace(EXTENSION_TOKEN, extension))
}

fn corrupt(element: &str, normalized: &str) -> HubError {
    HubError::internal(format!(
        "'{normalized}' is not a canonical phone number for '{element}'"
    ))
}
