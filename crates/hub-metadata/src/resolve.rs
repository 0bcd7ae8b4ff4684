//! Schema inheritance resolution.
//!
//! Bases are looked up by case-insensitive name within the same batch, so
//! load order does not matter. Chains are resolved transitively (a base is
//! fully resolved before anything inherits from it) and cycles are rejected.
//!
//! An element named `schema.field` also inherits from `field` of `schema`
//! when that schema is in the batch.

use std::collections::{BTreeMap, BTreeSet};

use hub_model::{Element, Result, Schema, SchemaError};
use tracing::debug;

pub(crate) fn schema_key(name: &str) -> String {
    name.to_lowercase()
}

/// Resolve every schema of a load batch, keeping the input order.
pub fn resolve_schemas(raw: &[Schema]) -> Result<Vec<Schema>> {
    let mut resolver = Resolver {
        raw: raw
            .iter()
            .map(|schema| (schema_key(&schema.name), schema))
            .collect(),
        resolved: BTreeMap::new(),
        in_progress: BTreeSet::new(),
    };
    for schema in raw {
        resolver.resolve(&schema_key(&schema.name))?;
    }
    raw.iter()
        .map(|schema| {
            resolver
                .resolved
                .remove(&schema_key(&schema.name))
                .ok_or_else(|| SchemaError::DuplicateSchema {
                    schema: schema.name.clone(),
                }
                .into())
        })
        .collect()
}

struct Resolver<'a> {
    raw: BTreeMap<String, &'a Schema>,
    resolved: BTreeMap<String, Schema>,
    in_progress: BTreeSet<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, key: &str) -> Result<()> {
        if self.resolved.contains_key(key) {
            return Ok(());
        }
        let Some(&schema) = self.raw.get(key) else {
            return Ok(());
        };
        self.in_progress.insert(key.to_string());

        let base = match schema.base_reference() {
            Some(base_name) => {
                let base_key = schema_key(base_name);
                if !self.raw.contains_key(&base_key) {
                    return Err(SchemaError::UnresolvedBase {
                        schema: schema.name.clone(),
                        base: base_name.to_string(),
                    }
                    .into());
                }
                self.resolve_dependency(schema, &base_key, base_name)?;
                self.resolved.get(&base_key).cloned()
            }
            None => None,
        };

        for element in &schema.elements {
            if let Some((schema_part, _)) = element.name.split_once('.') {
                let referenced = schema_key(schema_part);
                if referenced != key && self.raw.contains_key(&referenced) {
                    self.resolve_dependency(schema, &referenced, schema_part)?;
                }
            }
        }

        let mut elements: Vec<Element> = schema
            .elements
            .iter()
            .map(|element| match self.base_element(base.as_ref(), element) {
                Some(base_element) => element.inherit_from(base_element),
                None => element.clone(),
            })
            .collect();

        if schema.extends.is_some()
            && let Some(base) = &base
        {
            elements.extend(
                base.elements
                    .iter()
                    .filter(|element| !schema.contains_element(&element.name))
                    .cloned(),
            );
        }

        debug!(
            schema = %schema.name,
            base = schema.base_reference().unwrap_or(""),
            elements = elements.len(),
            "resolved schema"
        );

        let mut resolved = schema.clone();
        resolved.elements = elements;
        self.in_progress.remove(key);
        self.resolved.insert(key.to_string(), resolved);
        Ok(())
    }

    fn resolve_dependency(&mut self, schema: &Schema, key: &str, name: &str) -> Result<()> {
        if self.in_progress.contains(key) {
            return Err(SchemaError::InheritanceCycle {
                schema: schema.name.clone(),
                base: name.to_string(),
            }
            .into());
        }
        self.resolve(key)
    }

    /// Same-named element of the declared base, else the element a dotted
    /// name points at.
    fn base_element<'s>(&'s self, base: Option<&'s Schema>, element: &Element) -> Option<&'s Element> {
        base.and_then(|base| base.find_element(&element.name))
            .or_else(|| {
                let (schema_part, field) = element.name.split_once('.')?;
                self.resolved
                    .get(&schema_key(schema_part))?
                    .find_element(field)
            })
    }
}
