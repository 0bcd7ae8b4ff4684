//! Per-type parsing and rendering of field values.
//!
//! - **datetime**: DATE and DATETIME with ordered pattern fallbacks
//! - **code**: CODE translation through value sets and alt values
//! - **telephone**: TELEPHONE via libphonenumber rules
//! - **postal**: POSTAL_CODE validation and zip projections
//! - **hd**: HD hierarchic designators

pub mod code;
pub mod datetime;
pub mod hd;
pub mod postal;
pub mod telephone;

pub use code::{format_code, normalize_code, resolve_value_set};
pub use datetime::{format_date, format_datetime, normalize_date, normalize_datetime};
pub use hd::{format_hd, normalize_hd, parse_hd};
pub use postal::{format_postal_code, normalize_postal_code};
pub use telephone::{format_telephone, normalize_telephone};
