//! CODE values: translation among raw codes, display text and system codes.
//!
//! The `$alt` format always reads the element's inline alt values, even when
//! the element also names a value set. Every other format needs the value set.

use hub_model::{Element, HubError, Result, SchemaError, ValidationError, ValueSet, ValueSetSource};

use crate::formats::{
    ALT_DISPLAY_FORMAT, DISPLAY_FORMAT, NULL_FLAVOR_SYSTEM, SYSTEM_FORMAT, UNKNOWN_CODE,
};

fn require_alt_values(element: &Element) -> Result<()> {
    if !element.is_code_type() {
        return Err(SchemaError::NotCodeElement {
            element: element.name.clone(),
        }
        .into());
    }
    if element.alt_values.is_none() {
        return Err(SchemaError::MissingAltValues {
            element: element.name.clone(),
        }
        .into());
    }
    Ok(())
}

/// The value set an element's codes come from.
pub fn resolve_value_set<'a>(
    element: &Element,
    value_sets: &'a dyn ValueSetSource,
) -> Result<&'a ValueSet> {
    let Some(name) = element.value_set.as_deref() else {
        return Err(SchemaError::MissingValueSet {
            element: element.name.clone(),
        }
        .into());
    };
    value_sets.find_value_set(name).ok_or_else(|| {
        SchemaError::UnknownValueSet {
            element: element.name.clone(),
            value_set: name.to_string(),
        }
        .into()
    })
}

pub fn normalize_code(
    element: &Element,
    value: &str,
    format: Option<&str>,
    value_sets: &dyn ValueSetSource,
) -> Result<String> {
    if format == Some(ALT_DISPLAY_FORMAT) {
        require_alt_values(element)?;
        return element.to_alt_code(value).map(str::to_string).ok_or_else(|| {
            ValidationError::new(&element.name, value, "not a display value in alt values").into()
        });
    }
    let set = resolve_value_set(element, value_sets)?;
    let code = if format == Some(DISPLAY_FORMAT) {
        set.to_code_from_display(value)
            .ok_or_else(|| ValidationError::new(&element.name, value, "not a display value"))?
    } else {
        set.to_normalized_code(value)
            .ok_or_else(|| ValidationError::new(&element.name, value, "does not match any code"))?
    };
    Ok(code.to_string())
}

pub fn format_code(
    element: &Element,
    normalized: &str,
    format: Option<&str>,
    value_sets: &dyn ValueSetSource,
) -> Result<String> {
    if format == Some(ALT_DISPLAY_FORMAT) {
        require_alt_values(element)?;
        return element
            .to_alt_display(normalized)
            .map(str::to_string)
            .ok_or_else(|| {
                HubError::internal(format!(
                    "'{normalized}' is not in the alt values of '{}'",
                    element.name
                ))
            });
    }
    let set = resolve_value_set(element, value_sets)?;
    match format {
        Some(DISPLAY_FORMAT) => set
            .to_display_from_code(normalized)
            .map(str::to_string)
            .ok_or_else(|| {
                HubError::internal(format!(
                    "'{normalized}' cannot be formatted for '{}'",
                    element.name
                ))
            }),
        Some(SYSTEM_FORMAT) => {
            if set.is_unknown_code_table() && normalized == UNKNOWN_CODE {
                Ok(NULL_FLAVOR_SYSTEM.to_string())
            } else {
                Ok(set.system_code())
            }
        }
        _ => Ok(normalized.to_string()),
    }
}
