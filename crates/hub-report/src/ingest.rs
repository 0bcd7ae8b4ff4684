//! Building reports from submitted rows.

use std::sync::Arc;

use hub_metadata::MetadataCatalog;
use hub_model::redact::redact_value;
use hub_model::{
    EngineOptions, HubError, Result, RoutingError, RowError, RowErrorPolicy, Schema, Source,
};
use hub_transform::FieldContext;
use tracing::{debug, info, warn};

use crate::report::Report;

/// A report plus the rows that were rejected on the way in.
#[derive(Debug)]
pub struct IngestOutcome {
    pub report: Report,
    pub errors: Vec<RowError>,
}

impl IngestOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct RecordIngestor<'a> {
    catalog: &'a MetadataCatalog,
    options: EngineOptions,
}

impl<'a> RecordIngestor<'a> {
    pub fn new(catalog: &'a MetadataCatalog) -> Self {
        Self {
            catalog,
            options: EngineOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Take rows as they are, one value per schema element in element order.
    pub fn ingest(
        &self,
        schema: Arc<Schema>,
        rows: Vec<Vec<String>>,
        source: Source,
    ) -> Result<Report> {
        let report = Report::new(schema, rows, vec![source], None)?;
        debug!(
            report = %report.id(),
            schema = %report.schema().name,
            rows = report.row_count(),
            "ingested rows"
        );
        Ok(report)
    }

    /// Normalize externally formatted rows.
    ///
    /// `header` names the input columns. Each element reads the column of its
    /// primary binding with that binding's format; elements with no binding
    /// or a blank value get their default. Rows with a value that fails to
    /// normalize are handled per [`RowErrorPolicy`].
    pub fn ingest_formatted(
        &self,
        schema: Arc<Schema>,
        header: &[String],
        rows: Vec<Vec<String>>,
        source: Source,
    ) -> Result<IngestOutcome> {
        let context = FieldContext::with_options(self.catalog, &self.options);
        let bindings: Vec<Option<(usize, Option<&str>)>> = schema
            .elements
            .iter()
            .map(|element| {
                let field = element.primary_csv_field()?;
                let index = header
                    .iter()
                    .position(|name| name.eq_ignore_ascii_case(&field.name))?;
                Some((index, field.format.as_deref()))
            })
            .collect();

        let mut accepted = Vec::with_capacity(rows.len());
        let mut errors = Vec::new();
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != header.len() {
                return Err(RoutingError::RowShape {
                    schema: schema.name.clone(),
                    row: row_index,
                    expected: header.len(),
                    found: row.len(),
                }
                .into());
            }

            let mut values = Vec::with_capacity(schema.elements.len());
            let mut row_errors = Vec::new();
            for (element, binding) in schema.elements.iter().zip(&bindings) {
                let raw = binding.map_or("", |(index, _)| row[index].as_str());
                if raw.trim().is_empty() {
                    values.push(element.default_value().to_string());
                    continue;
                }
                let format = binding.and_then(|(_, format)| format);
                match context.to_normalized(element, raw, format) {
                    Ok(value) => values.push(value),
                    Err(error) if error.is_validation() => row_errors.push(error),
                    Err(error) => return Err(error),
                }
            }

            if row_errors.is_empty() {
                accepted.push(values);
                continue;
            }
            for error in row_errors {
                if self.options.row_errors == RowErrorPolicy::FailFast {
                    return Err(error);
                }
                warn!(row = row_index, %error, "rejected row");
                errors.push(RowError {
                    row: row_index,
                    error,
                });
            }
        }

        let report = Report::new(schema, accepted, vec![source], None)?;
        log_outcome(&report, rows.len(), &errors);
        Ok(IngestOutcome { report, errors })
    }
}

fn log_outcome(report: &Report, submitted: usize, errors: &[RowError]) {
    info!(
        report = %report.id(),
        schema = %report.schema().name,
        submitted,
        accepted = report.row_count(),
        errors = errors.len(),
        "ingested formatted rows"
    );
    for RowError { row, error } in errors {
        if let HubError::Validation(validation) = error {
            debug!(
                row,
                element = %validation.element,
                value = redact_value(&validation.value),
                "row value rejected"
            );
        }
    }
}
