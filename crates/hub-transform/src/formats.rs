//! Format tokens accepted by output bindings.
//!
//! A binding's `format` is either one of these tokens or, for DATE and
//! DATETIME elements, a date pattern.

/// Canonical DATE pattern (`yyyyMMdd`).
pub const DATE_PATTERN: &str = "%Y%m%d";
/// Canonical DATETIME pattern (`yyyyMMddHHmmZZZ`).
pub const DATETIME_PATTERN: &str = "%Y%m%d%H%M%z";

// CODE
pub const DISPLAY_FORMAT: &str = "$display";
pub const CODE_FORMAT: &str = "$code";
pub const SYSTEM_FORMAT: &str = "$system";
pub const ALT_DISPLAY_FORMAT: &str = "$alt";

/// Sentinel emitted for `UNK` in the unknown-code table under `$system`.
pub const NULL_FLAVOR_SYSTEM: &str = "NULLFL";
pub const UNKNOWN_CODE: &str = "UNK";

// TELEPHONE
pub const AREA_CODE_TOKEN: &str = "$area";
pub const EXCHANGE_TOKEN: &str = "$exchange";
pub const SUBSCRIBER_TOKEN: &str = "$subscriber";
pub const COUNTRY_CODE_TOKEN: &str = "$country";
pub const EXTENSION_TOKEN: &str = "$extension";
pub const DEFAULT_PHONE_FORMAT: &str = "$area$exchange$subscriber";
pub const PHONE_DELIMITER: char = ':';

// HD
pub const HD_DELIMITER: char = '&';
pub const HD_NAME_TOKEN: &str = "$name";
pub const HD_UNIVERSAL_ID_TOKEN: &str = "$universalId";
pub const HD_SYSTEM_TOKEN: &str = "$system";

// POSTAL_CODE
pub const ZIP_FIVE_TOKEN: &str = "$zipFive";
pub const ZIP_FIVE_PLUS_FOUR_TOKEN: &str = "$zipFivePlusFour";
pub const US_ZIP_FORMAT: &str = r"^(\d{5})[- ]?(\d{4})?$";
