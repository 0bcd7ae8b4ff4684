//! Projecting a report onto another schema of the same topic.

use std::sync::Arc;

use hub_metadata::{
    FieldSource, MapperCall, MapperContext, MapperInput, MetadataCatalog, SchemaMapping,
};
use hub_model::{Element, Result, RoutingError, SchemaError};
use polars::prelude::{Column, IntoColumn};
use tracing::{debug, warn};

use crate::frame::{build_frame, constant_column, string_column};
use crate::report::{MAPPING_ACTION, Report};

impl Report {
    /// Build one column per target element, in target order.
    ///
    /// The row count never changes. Required elements the mapping could not
    /// source are filled like defaulted ones and logged.
    pub fn apply_mapping(
        &self,
        mapping: &SchemaMapping,
        catalog: &MetadataCatalog,
    ) -> Result<Report> {
        if mapping.from_schema != *self.schema() {
            return Err(RoutingError::SchemaMismatch {
                expected: mapping.from_schema.name.clone(),
                found: self.schema().name.clone(),
            }
            .into());
        }
        if mapping.to_schema.elements.is_empty() {
            return Err(SchemaError::EmptySchema {
                schema: mapping.to_schema.name.clone(),
            }
            .into());
        }
        if !mapping.is_complete() {
            warn!(
                from = %mapping.from_schema.name,
                to = %mapping.to_schema.name,
                missing = ?mapping.missing,
                "required elements have no source, filling with defaults"
            );
        }

        let height = self.row_count();
        let mut columns: Vec<Column> = Vec::with_capacity(mapping.to_schema.elements.len());
        for element in &mapping.to_schema.elements {
            let column = match mapping.source_of(&element.name) {
                FieldSource::Direct(source) => {
                    let mut column = self.column(source)?.clone().into_column();
                    column.rename(element.name.as_str().into());
                    column
                }
                FieldSource::Mapper(call) => self.mapped_column(element, call, catalog)?,
                FieldSource::Default | FieldSource::Missing => {
                    constant_column(&element.name, element.default_value(), height)
                }
            };
            columns.push(column);
        }

        let table = build_frame(columns)?;
        debug!(
            from = %mapping.from_schema.name,
            to = %mapping.to_schema.name,
            rows = height,
            "applied mapping"
        );
        Ok(self.derive(Arc::clone(&mapping.to_schema), table, MAPPING_ACTION))
    }

    fn mapped_column(
        &self,
        element: &Element,
        call: &MapperCall,
        catalog: &MetadataCatalog,
    ) -> Result<Column> {
        let inputs = call
            .inputs
            .iter()
            .filter(|name| self.schema().contains_element(name))
            .map(|name| -> Result<_> { Ok((name.as_str(), self.column(name)?)) })
            .collect::<Result<Vec<_>>>()?;
        let context = MapperContext {
            element,
            source: self.schema().as_ref(),
            catalog,
        };

        let values = (0..self.row_count())
            .map(|row| {
                let present: Vec<MapperInput<'_>> = inputs
                    .iter()
                    .filter_map(|(name, values)| {
                        values
                            .get(row)
                            .filter(|value| !value.trim().is_empty())
                            .map(|value| MapperInput {
                                element: *name,
                                value,
                            })
                    })
                    .collect();
                call.mapper
                    .apply(&context, &call.args, &present)
                    .unwrap_or_else(|| element.default_value().to_string())
            })
            .collect();
        Ok(string_column(&element.name, values))
    }
}
