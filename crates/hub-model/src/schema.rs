//! Schemas: a named, ordered collection of elements for one topic.
//!
//! A schema may be `basedOn` another schema, in which case the elements it
//! names inherit the attributes they leave unset from the base element of the
//! same name. A schema that `extends` another inherits the same way and also
//! gets every base element it does not name itself, appended in base order.
//!
//! ```text
//! name: state_schema
//! basedOn: covid-19
//! elements:
//!   - name: patient_first_name
//!     csvFields: [{ name: PatientFirstName }]
//! ```

use serde::{Deserialize, Serialize};

use crate::element::{CsvField, Element};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Unique name; may be path-like (`fl/fl-covid-19`).
    pub name: String,
    /// Schemas on the same topic can be mapped onto each other.
    pub topic: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Element that is unique per item and used for tracking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_element: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub based_on: Option<String>,
}

impl Schema {
    pub fn new(name: impl Into<String>, topic: impl Into<String>, elements: Vec<Element>) -> Self {
        Self {
            name: name.into(),
            topic: topic.into(),
            elements,
            tracking_element: None,
            description: None,
            reference_url: None,
            extends: None,
            based_on: None,
        }
    }

    #[must_use]
    pub fn with_based_on(mut self, base: impl Into<String>) -> Self {
        self.based_on = Some(base.into());
        self
    }

    #[must_use]
    pub fn with_extends(mut self, base: impl Into<String>) -> Self {
        self.extends = Some(base.into());
        self
    }

    /// The last segment of a path-like schema name.
    pub fn base_name(&self) -> &str {
        form_base_name(&self.name)
    }

    /// The schema this one inherits from, `extends` taking precedence.
    pub fn base_reference(&self) -> Option<&str> {
        self.extends.as_deref().or(self.based_on.as_deref())
    }

    pub fn find_element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.name == name)
    }

    pub fn contains_element(&self, name: &str) -> bool {
        self.find_element(name).is_some()
    }

    pub fn element_index(&self, name: &str) -> Option<usize> {
        self.elements
            .iter()
            .position(|element| element.name == name)
    }

    pub fn element_names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|element| element.name.as_str())
    }

    /// All output bindings, in element order.
    pub fn csv_fields(&self) -> Vec<&CsvField> {
        self.elements
            .iter()
            .flat_map(|element| element.csv_fields())
            .collect()
    }

    /// First element name that appears more than once.
    pub fn duplicate_element(&self) -> Option<&str> {
        let mut seen = std::collections::BTreeSet::new();
        self.elements
            .iter()
            .map(|element| element.name.as_str())
            .find(|name| !seen.insert(*name))
    }
}

pub fn form_base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
