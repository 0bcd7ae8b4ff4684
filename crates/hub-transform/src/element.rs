//! Element-level normalize/format dispatch.

use chrono_tz::Tz;
use hub_model::redact::redact_value;
use hub_model::{
    Element, ElementType, EngineOptions, Result, RowErrorPolicy, UsTimeZone, ValidationError,
    ValueSetSource,
};
use tracing::trace;

use crate::normalization::{
    format_code, format_date, format_datetime, format_hd, format_postal_code, format_telephone,
    normalize_code, normalize_date, normalize_datetime, normalize_hd, normalize_postal_code,
    normalize_telephone,
};

/// What normalize/format needs beyond the element itself.
#[derive(Clone, Copy)]
pub struct FieldContext<'a> {
    value_sets: &'a dyn ValueSetSource,
    reference_zone: Tz,
    row_errors: RowErrorPolicy,
}

impl<'a> FieldContext<'a> {
    pub fn new(value_sets: &'a dyn ValueSetSource) -> Self {
        Self {
            value_sets,
            reference_zone: UsTimeZone::Central.tz(),
            row_errors: RowErrorPolicy::default(),
        }
    }

    pub fn with_options(value_sets: &'a dyn ValueSetSource, options: &EngineOptions) -> Self {
        Self {
            value_sets,
            reference_zone: options.reference_time_zone.tz(),
            row_errors: options.row_errors,
        }
    }

    #[must_use]
    pub fn with_reference_zone(mut self, zone: UsTimeZone) -> Self {
        self.reference_zone = zone.tz();
        self
    }

    #[must_use]
    pub fn with_row_errors(mut self, policy: RowErrorPolicy) -> Self {
        self.row_errors = policy;
        self
    }

    pub fn value_sets(&self) -> &'a dyn ValueSetSource {
        self.value_sets
    }

    pub fn reference_zone(&self) -> Tz {
        self.reference_zone
    }

    /// How callers working row by row treat a failing row.
    pub fn row_errors(&self) -> RowErrorPolicy {
        self.row_errors
    }

    /// Parse an externally formatted value into its canonical form.
    pub fn to_normalized(
        &self,
        element: &Element,
        formatted: &str,
        format: Option<&str>,
    ) -> Result<String> {
        if formatted.is_empty() {
            return Ok(String::new());
        }
        let name = element.name.as_str();
        let result = match element.element_type() {
            ElementType::Date => normalize_date(name, formatted, format),
            ElementType::Datetime => {
                normalize_datetime(name, formatted, format, self.reference_zone)
            }
            ElementType::Code => normalize_code(element, formatted, format, self.value_sets),
            ElementType::Telephone => normalize_telephone(name, formatted),
            ElementType::PostalCode => normalize_postal_code(name, formatted),
            ElementType::Hd => normalize_hd(name, formatted),
            ElementType::Text
            | ElementType::Number
            | ElementType::Duration
            | ElementType::Table
            | ElementType::Id
            | ElementType::IdClia
            | ElementType::IdDln
            | ElementType::IdSsn
            | ElementType::IdNpi
            | ElementType::Street
            | ElementType::City
            | ElementType::State
            | ElementType::County
            | ElementType::PersonName
            | ElementType::Email => Ok(formatted.to_string()),
        };
        if let Err(error) = &result {
            trace!(
                element = name,
                value = redact_value(formatted),
                %error,
                "normalize failed"
            );
        }
        result
    }

    /// Render a canonical value for one output binding.
    pub fn to_formatted(
        &self,
        element: &Element,
        normalized: &str,
        format: Option<&str>,
    ) -> Result<String> {
        if normalized.is_empty() {
            return Ok(String::new());
        }
        let name = element.name.as_str();
        match element.element_type() {
            ElementType::Date => format_date(name, normalized, format),
            ElementType::Datetime => format_datetime(name, normalized, format),
            ElementType::Code => format_code(element, normalized, format, self.value_sets),
            ElementType::Telephone => format_telephone(name, normalized, format),
            ElementType::PostalCode => Ok(format_postal_code(normalized, format)),
            ElementType::Hd => format_hd(name, normalized, format),
            ElementType::Text
            | ElementType::Number
            | ElementType::Duration
            | ElementType::Table
            | ElementType::Id
            | ElementType::IdClia
            | ElementType::IdDln
            | ElementType::IdSsn
            | ElementType::IdNpi
            | ElementType::Street
            | ElementType::City
            | ElementType::State
            | ElementType::County
            | ElementType::PersonName
            | ElementType::Email => Ok(normalized.to_string()),
        }
    }

    /// Check that a stored value is in canonical form for its element.
    ///
    /// Canonical values re-normalize to themselves, except telephone numbers,
    /// which are checked by their layout.
    pub fn check_normalized(&self, element: &Element, normalized: &str) -> Result<()> {
        if normalized.is_empty() {
            return Ok(());
        }
        match element.element_type() {
            ElementType::Telephone => format_telephone(&element.name, normalized, None).map(drop),
            ElementType::Code if element.value_set.is_none() => match &element.alt_values {
                Some(_) if element.to_alt_display(normalized).is_none() => Err(
                    ValidationError::new(&element.name, normalized, "not a code in alt values")
                        .into(),
                ),
                _ => Ok(()),
            },
            _ => self.to_normalized(element, normalized, None).map(drop),
        }
    }
}
