//! Normalization and formatting of report field values.
//!
//! Every element type has a canonical string form. `to_normalized` parses an
//! externally formatted value into it; `to_formatted` renders it for one
//! output binding. Empty values stay empty in both directions.

pub mod element;
pub mod formats;
pub mod normalization;
pub mod pattern;

pub use element::FieldContext;
pub use pattern::to_chrono_pattern;
