//! Value sets: named code/display catalogs used by CODE elements.
//!
//! A value set is an ordered list of entries. Each entry carries the raw code,
//! an optional display text and an optional version. All lookups are
//! case-insensitive, and the first matching entry wins.
//!
//! ## Example: `hl70136` (Yes/No indicator)
//!
//! ```text
//! system: HL7
//! values: Y -> Yes, N -> No, UNK -> Unknown
//! system code: HL70136
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the HL7 yes/no/unknown table that carries the `NULLFL` special case.
pub const UNKNOWN_CODE_TABLE: &str = "hl70136";

/// The coding system a value set draws its codes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetSystem {
    Hl7,
    SnomedCt,
    Loinc,
    Local,
}

impl SetSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetSystem::Hl7 => "HL7",
            SetSystem::SnomedCt => "SNOMED_CT",
            SetSystem::Loinc => "LOINC",
            SetSystem::Local => "LOCAL",
        }
    }
}

impl fmt::Display for SetSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a value set (or of an element's inline alt values).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSetValue {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ValueSetValue {
    pub fn new(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: Some(display.into()),
            version: None,
        }
    }

    pub fn code_only(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: None,
            version: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSet {
    pub name: String,
    pub system: SetSystem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
    #[serde(default)]
    pub values: Vec<ValueSetValue>,
}

impl ValueSet {
    pub fn new(name: impl Into<String>, system: SetSystem) -> Self {
        Self {
            name: name.into(),
            system,
            reference: None,
            reference_url: None,
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_values(mut self, values: Vec<ValueSetValue>) -> Self {
        self.values = values;
        self
    }

    /// The fixed code identifying this set's coding system in output.
    ///
    /// HL7 tables named `hl7NNNN` render as `HL7NNNN`.
    pub fn system_code(&self) -> String {
        match self.system {
            SetSystem::Hl7 => {
                let table = strip_prefix_ignore_case(&self.name, "hl7").unwrap_or(&self.name);
                format!("HL7{table}")
            }
            SetSystem::Loinc => "LN".to_string(),
            SetSystem::SnomedCt => "SCT".to_string(),
            SetSystem::Local => "LOCAL".to_string(),
        }
    }

    pub fn to_display_from_code(&self, code: &str) -> Option<&str> {
        find_by_code(&self.values, code).and_then(|value| value.display.as_deref())
    }

    pub fn to_code_from_display(&self, display: &str) -> Option<&str> {
        find_by_display(&self.values, display).map(|value| value.code.as_str())
    }

    /// Return the code exactly as this set spells it.
    pub fn to_normalized_code(&self, code: &str) -> Option<&str> {
        find_by_code(&self.values, code).map(|value| value.code.as_str())
    }

    pub fn is_unknown_code_table(&self) -> bool {
        self.name.eq_ignore_ascii_case(UNKNOWN_CODE_TABLE)
    }
}

pub fn find_by_code<'a>(values: &'a [ValueSetValue], code: &str) -> Option<&'a ValueSetValue> {
    values
        .iter()
        .find(|value| value.code.eq_ignore_ascii_case(code))
}

pub fn find_by_display<'a>(
    values: &'a [ValueSetValue],
    display: &str,
) -> Option<&'a ValueSetValue> {
    values.iter().find(|value| {
        value
            .display
            .as_deref()
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(display))
    })
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    if value.len() >= prefix.len()
        && value.is_char_boundary(prefix.len())
        && value[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&value[prefix.len()..])
    } else {
        None
    }
}

/// Read access to value sets by name.
///
/// Implemented by the metadata catalog; element formatting only depends on
/// this seam so it can be exercised against a plain list of sets.
pub trait ValueSetSource {
    fn find_value_set(&self, name: &str) -> Option<&ValueSet>;
}

impl ValueSetSource for [ValueSet] {
    fn find_value_set(&self, name: &str) -> Option<&ValueSet> {
        self.iter().find(|set| set.name.eq_ignore_ascii_case(name))
    }
}

impl ValueSetSource for Vec<ValueSet> {
    fn find_value_set(&self, name: &str) -> Option<&ValueSet> {
        self.as_slice().find_value_set(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yes_no() -> ValueSet {
        ValueSet::new("hl70136", SetSystem::Hl7).with_values(vec![
            ValueSetValue::new("Y", "Yes"),
            ValueSetValue::new("N", "No"),
            ValueSetValue::new("UNK", "Unknown"),
        ])
    }

    #[test]
    fn system_codes() {
        assert_eq!(yes_no().system_code(), "HL70136");
        assert_eq!(ValueSet::new("covid", SetSystem::Loinc).system_code(), "LN");
        assert_eq!(ValueSet::new("x", SetSystem::SnomedCt).system_code(), "SCT");
        assert_eq!(ValueSet::new("x", SetSystem::Local).system_code(), "LOCAL");
    }

    #[test]
    fn lookups_ignore_case() {
        let set = yes_no();
        assert_eq!(set.to_display_from_code("y"), Some("Yes"));
        assert_eq!(set.to_code_from_display("UNKNOWN"), Some("UNK"));
        assert_eq!(set.to_normalized_code("unk"), Some("UNK"));
        assert_eq!(set.to_normalized_code("maybe"), None);
        assert!(set.is_unknown_code_table());
    }
}
