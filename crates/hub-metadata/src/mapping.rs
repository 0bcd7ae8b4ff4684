//! Mapping derivation: how each element of a target schema gets its values
//! from a source schema of the same topic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use hub_model::{Result, RoutingError, Schema, SchemaError};
use tracing::debug;

use crate::catalog::MetadataCatalog;
use crate::expr::parse_call;
use crate::mappers::Mapper;

/// A resolved mapper invocation for one target element.
#[derive(Clone)]
pub struct MapperCall {
    pub mapper: Arc<dyn Mapper>,
    pub args: Vec<String>,
    /// Source elements the mapper reads, in argument order.
    pub inputs: Vec<String>,
}

impl fmt::Debug for MapperCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperCall")
            .field("mapper", &self.mapper.name())
            .field("args", &self.args)
            .field("inputs", &self.inputs)
            .finish()
    }
}

/// How one target element is filled.
#[derive(Debug, Clone, Copy)]
pub enum FieldSource<'m> {
    /// Copy the named source column.
    Direct(&'m str),
    Mapper(&'m MapperCall),
    /// Fill with the element default, or empty.
    Default,
    /// Required, but nothing can fill it.
    Missing,
}

/// Every target element lands in exactly one of the four classes.
#[derive(Debug, Clone)]
pub struct SchemaMapping {
    pub from_schema: Arc<Schema>,
    pub to_schema: Arc<Schema>,
    /// Target element name to source element name.
    pub use_directly: BTreeMap<String, String>,
    pub use_mapper: BTreeMap<String, MapperCall>,
    pub use_default: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}

impl SchemaMapping {
    pub fn source_of(&self, element: &str) -> FieldSource<'_> {
        if let Some(source) = self.use_directly.get(element) {
            FieldSource::Direct(source)
        } else if let Some(call) = self.use_mapper.get(element) {
            FieldSource::Mapper(call)
        } else if self.use_default.contains(element) {
            FieldSource::Default
        } else {
            FieldSource::Missing
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Classify every element of `to_schema`.
///
/// A source element of the same name wins, then the element's mapper, then
/// its default when the element is optional. Required elements with none of
/// these are recorded as missing rather than failing here.
pub fn build_mapping(
    from_schema: &Arc<Schema>,
    to_schema: &Arc<Schema>,
    catalog: &MetadataCatalog,
) -> Result<SchemaMapping> {
    if from_schema.topic != to_schema.topic {
        return Err(RoutingError::TopicMismatch {
            from: from_schema.name.clone(),
            from_topic: from_schema.topic.clone(),
            to: to_schema.name.clone(),
            to_topic: to_schema.topic.clone(),
        }
        .into());
    }

    let mut use_directly = BTreeMap::new();
    let mut use_mapper = BTreeMap::new();
    let mut use_default = BTreeSet::new();
    let mut missing = BTreeSet::new();

    for element in &to_schema.elements {
        if let Some(source) = from_schema.find_element(&element.name) {
            use_directly.insert(element.name.clone(), source.name.clone());
            continue;
        }
        if let Some(expression) = element.mapper.as_deref() {
            let call = parse_call(expression)?;
            let mapper = catalog
                .find_mapper(&call.name)
                .cloned()
                .ok_or_else(|| SchemaError::UnknownMapper {
                    element: element.name.clone(),
                    mapper: call.name.clone(),
                })?;
            let inputs = mapper
                .element_names(element, &call.args)
                .map_err(|reason| SchemaError::InvalidMapperArgs {
                    element: element.name.clone(),
                    mapper: call.name.clone(),
                    reason,
                })?;
            use_mapper.insert(
                element.name.clone(),
                MapperCall {
                    mapper,
                    args: call.args,
                    inputs,
                },
            );
            continue;
        }
        if element.is_required() {
            missing.insert(element.name.clone());
        } else {
            use_default.insert(element.name.clone());
        }
    }

    debug!(
        from = %from_schema.name,
        to = %to_schema.name,
        direct = use_directly.len(),
        mapped = use_mapper.len(),
        defaulted = use_default.len(),
        missing = missing.len(),
        "built schema mapping"
    );

    Ok(SchemaMapping {
        from_schema: Arc::clone(from_schema),
        to_schema: Arc::clone(to_schema),
        use_directly,
        use_mapper,
        use_default,
        missing,
    })
}
