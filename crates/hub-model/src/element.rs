//! Element definitions: a single named, typed field of a schema.
//!
//! Every attribute other than the name is optional so that an element can
//! inherit what it does not declare from a base element of the same name
//! (see [`Element::inherit_from`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::value_set::{ValueSetValue, find_by_code, find_by_display};

/// Closed set of field types. Normalize/format dispatch matches on this
/// exhaustively, so a new variant must be handled everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementType {
    Text,
    Number,
    Date,
    Datetime,
    Duration,
    /// Coded with an HL7, SNOMED-CT or LOINC value set (or inline alt values).
    Code,
    /// A lookup table column value.
    Table,
    /// ISO hierarchic designator.
    Hd,
    Id,
    IdClia,
    IdDln,
    IdSsn,
    IdNpi,
    Street,
    City,
    State,
    County,
    PostalCode,
    PersonName,
    Telephone,
    Email,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Text => "TEXT",
            ElementType::Number => "NUMBER",
            ElementType::Date => "DATE",
            ElementType::Datetime => "DATETIME",
            ElementType::Duration => "DURATION",
            ElementType::Code => "CODE",
            ElementType::Table => "TABLE",
            ElementType::Hd => "HD",
            ElementType::Id => "ID",
            ElementType::IdClia => "ID_CLIA",
            ElementType::IdDln => "ID_DLN",
            ElementType::IdSsn => "ID_SSN",
            ElementType::IdNpi => "ID_NPI",
            ElementType::Street => "STREET",
            ElementType::City => "CITY",
            ElementType::State => "STATE",
            ElementType::County => "COUNTY",
            ElementType::PostalCode => "POSTAL_CODE",
            ElementType::PersonName => "PERSON_NAME",
            ElementType::Telephone => "TELEPHONE",
            ElementType::Email => "EMAIL",
        }
    }

    pub fn is_id(&self) -> bool {
        matches!(
            self,
            ElementType::Id
                | ElementType::IdClia
                | ElementType::IdDln
                | ElementType::IdSsn
                | ElementType::IdNpi
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        let parsed = match normalized.as_str() {
            "TEXT" => ElementType::Text,
            "NUMBER" => ElementType::Number,
            "DATE" => ElementType::Date,
            "DATETIME" => ElementType::Datetime,
            "DURATION" => ElementType::Duration,
            "CODE" => ElementType::Code,
            "TABLE" => ElementType::Table,
            "HD" => ElementType::Hd,
            "ID" => ElementType::Id,
            "ID_CLIA" => ElementType::IdClia,
            "ID_DLN" => ElementType::IdDln,
            "ID_SSN" => ElementType::IdSsn,
            "ID_NPI" => ElementType::IdNpi,
            "STREET" => ElementType::Street,
            "CITY" => ElementType::City,
            "STATE" => ElementType::State,
            "COUNTY" => ElementType::County,
            "POSTAL_CODE" => ElementType::PostalCode,
            "PERSON_NAME" => ElementType::PersonName,
            "TELEPHONE" => ElementType::Telephone,
            "EMAIL" => ElementType::Email,
            _ => return Err(format!("Unknown element type: {s}")),
        };
        Ok(parsed)
    }
}

/// An output (and input) field binding. The first binding of an element is
/// its primary one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl CsvField {
    pub fn new(name: impl Into<String>, format: Option<&str>) -> Self {
        Self {
            name: name.into(),
            format: format.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// `field` for a new element, `baseSchema.field` for one that records
    /// where it was taken from.
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_values: Option<Vec<ValueSetValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pii: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phi: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Mapper call expression, e.g. `concat(patient_first_name, patient_last_name)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapper: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_fields: Option<Vec<CsvField>>,
}

/// Left-biased attribute inheritance: keep our value, else take the base's.
fn inherit<T: Clone>(own: &Option<T>, base: &Option<T>) -> Option<T> {
    own.as_ref().or(base.as_ref()).cloned()
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn typed(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            element_type: Some(element_type),
            ..Self::default()
        }
    }

    /// Fill every attribute this element leaves unset from `base`.
    #[must_use]
    pub fn inherit_from(&self, base: &Element) -> Element {
        Element {
            name: self.name.clone(),
            element_type: self.element_type.or(base.element_type),
            value_set: inherit(&self.value_set, &base.value_set),
            alt_values: inherit(&self.alt_values, &base.alt_values),
            table: inherit(&self.table, &base.table),
            table_column: inherit(&self.table_column, &base.table_column),
            required: self.required.or(base.required),
            pii: self.pii.or(base.pii),
            phi: self.phi.or(base.phi),
            default: inherit(&self.default, &base.default),
            mapper: inherit(&self.mapper, &base.mapper),
            reference: inherit(&self.reference, &base.reference),
            reference_url: inherit(&self.reference_url, &base.reference_url),
            documentation: inherit(&self.documentation, &base.documentation),
            csv_fields: inherit(&self.csv_fields, &base.csv_fields),
        }
    }

    /// The declared type; an untyped element behaves as TEXT.
    pub fn element_type(&self) -> ElementType {
        self.element_type.unwrap_or(ElementType::Text)
    }

    pub fn is_code_type(&self) -> bool {
        self.element_type == Some(ElementType::Code)
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn is_pii(&self) -> bool {
        self.pii.unwrap_or(false)
    }

    pub fn is_phi(&self) -> bool {
        self.phi.unwrap_or(false)
    }

    /// The default value, or empty.
    pub fn default_value(&self) -> &str {
        self.default.as_deref().unwrap_or("")
    }

    pub fn name_contains(&self, substring: &str) -> bool {
        self.name
            .to_lowercase()
            .contains(&substring.to_lowercase())
    }

    pub fn csv_fields(&self) -> &[CsvField] {
        self.csv_fields.as_deref().unwrap_or(&[])
    }

    pub fn primary_csv_field(&self) -> Option<&CsvField> {
        self.csv_fields().first()
    }

    /// True when the element can be filled without translating a code.
    pub fn written_without_source(&self) -> bool {
        self.default.is_some() || self.mapper.is_some()
    }

    pub fn to_alt_display(&self, code: &str) -> Option<&str> {
        let values = self.alt_values.as_deref()?;
        find_by_code(values, code).and_then(|value| value.display.as_deref())
    }

    pub fn to_alt_code(&self, display: &str) -> Option<&str> {
        let values = self.alt_values.as_deref()?;
        find_by_display(values, display).map(|value| value.code.as_str())
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    #[must_use]
    pub fn with_pii(mut self, pii: bool) -> Self {
        self.pii = Some(pii);
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: impl Into<String>) -> Self {
        self.mapper = Some(mapper.into());
        self
    }

    #[must_use]
    pub fn with_value_set(mut self, value_set: impl Into<String>) -> Self {
        self.value_set = Some(value_set.into());
        self
    }

    #[must_use]
    pub fn with_alt_values(mut self, values: Vec<ValueSetValue>) -> Self {
        self.alt_values = Some(values);
        self
    }

    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self.table_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_csv_field(mut self, name: impl Into<String>, format: Option<&str>) -> Self {
        self.csv_fields
            .get_or_insert_with(Vec::new)
            .push(CsvField::new(name, format));
        self
    }
}

/// The three parts of a hierarchic designator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdFields {
    pub name: String,
    pub universal_id: Option<String>,
    pub universal_id_system: Option<String>,
}
