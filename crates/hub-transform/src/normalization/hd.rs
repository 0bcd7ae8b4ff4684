//! HD (hierarchic designator) values: `name` or `name&universalId&system`.

use hub_model::{HdFields, HubError, Result, SchemaError, ValidationError};

use crate::formats::{HD_DELIMITER, HD_NAME_TOKEN, HD_SYSTEM_TOKEN, HD_UNIVERSAL_ID_TOKEN};

fn split_hd(value: &str) -> Option<HdFields> {
    let parts: Vec<&str> = value.split(HD_DELIMITER).collect();
    match parts.as_slice() {
        [name] => Some(HdFields {
            name: (*name).to_string(),
            universal_id: None,
            universal_id_system: None,
        }),
        [name, universal_id, system] => Some(HdFields {
            name: (*name).to_string(),
            universal_id: Some((*universal_id).to_string()),
            universal_id_system: Some((*system).to_string()),
        }),
        _ => None,
    }
}

/// Split a canonical HD value. Any other part count is a corrupt value.
pub fn parse_hd(value: &str) -> Result<HdFields> {
    split_hd(value).ok_or_else(|| HubError::internal(format!("invalid HD value '{value}'")))
}

/// HD input is stored as given once it has one or three parts.
pub fn normalize_hd(element: &str, value: &str) -> Result<String> {
    match split_hd(value) {
        Some(_) => Ok(value.to_string()),
        None => Err(ValidationError::new(element, value, "HD value needs 1 or 3 '&' parts").into()),
    }
}

pub fn format_hd(element: &str, normalized: &str, format: Option<&str>) -> Result<String> {
    let fields = parse_hd(normalized)?;
    let part = match format {
        None | Some(HD_NAME_TOKEN) => fields.name,
        Some(HD_UNIVERSAL_ID_TOKEN) => fields.universal_id.unwrap_or_default(),
        Some(HD_SYSTEM_TOKEN) => fields.universal_id_system.unwrap_or_default(),
        Some(other) => {
            return Err(SchemaError::UnsupportedFormat {
                element: element.to_string(),
                format: other.to_string(),
            }
            .into());
        }
    };
    Ok(part)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAB: &str = "Any lab USA&10D0999999&CLIA";

    #[test]
    fn extracts_parts() {
        assert_eq!(format_hd("h", LAB, None).unwrap(), "Any lab USA");
        assert_eq!(format_hd("h", LAB, Some("$universalId")).unwrap(), "10D0999999");
        assert_eq!(format_hd("h", LAB, Some("$system")).unwrap(), "CLIA");
        assert_eq!(format_hd("h", "CDC PRIME", Some("$system")).unwrap(), "");
    }

    #[test]
    fn unsupported_token_is_a_schema_error() {
        assert!(matches!(
            format_hd("h", LAB, Some("$display")),
            Err(HubError::Schema(SchemaError::UnsupportedFormat { .. }))
        ));
    }

    #[test]
    fn two_parts_are_invalid() {
        assert!(matches!(parse_hd("a&b"), Err(HubError::Internal { .. })));
        assert!(normalize_hd("h", "a&b").unwrap_err().is_validation());
        assert_eq!(normalize_hd("h", LAB).unwrap(), LAB);
    }
}
