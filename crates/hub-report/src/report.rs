//! The report: an immutable table of rows for one schema.
//!
//! Every column is named for an element of the schema and holds canonical
//! string values; all columns share the row count. Operations never change a
//! report in place. They return a new report with a fresh id whose sources
//! record what it was derived from.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hub_model::predicate::compile_pattern;
use hub_model::{
    OrganizationClient, OrganizationService, ReportId, Result, RoutingError, RowPredicate, Schema,
    SchemaError, Source,
};
use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray, StringChunked};
use tracing::debug;

use crate::frame::{constant_column, frame_error, frame_from_rows, str_values};

/// Timestamp layout used in report names.
pub const NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub const COPY_ACTION: &str = "copy";
pub const FILTER_ACTION: &str = "filter";
pub const DEIDENTIFY_ACTION: &str = "deidentify";
pub const MAPPING_ACTION: &str = "mapping";
pub const MERGE_ACTION: &str = "merge";

#[derive(Debug, Clone)]
pub struct Report {
    id: ReportId,
    schema: Arc<Schema>,
    sources: Vec<Source>,
    destination: Option<Arc<OrganizationService>>,
    created_at: DateTime<Utc>,
    table: DataFrame,
}

impl Report {
    /// Build a report from rows ordered like the schema's elements.
    ///
    /// The schema needs at least one element; the row count lives in the
    /// columns.
    pub fn new(
        schema: Arc<Schema>,
        rows: Vec<Vec<String>>,
        sources: Vec<Source>,
        destination: Option<Arc<OrganizationService>>,
    ) -> Result<Self> {
        let expected = schema.elements.len();
        if expected == 0 {
            return Err(SchemaError::EmptySchema {
                schema: schema.name.clone(),
            }
            .into());
        }
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != expected)
        {
            return Err(RoutingError::RowShape {
                schema: schema.name.clone(),
                row,
                expected,
                found: values.len(),
            }
            .into());
        }
        let names: Vec<&str> = schema.element_names().collect();
        let table = frame_from_rows(&names, rows)?;
        Ok(Self::from_parts(schema, table, sources, destination))
    }

    pub fn from_client(
        schema: Arc<Schema>,
        rows: Vec<Vec<String>>,
        client: &OrganizationClient,
    ) -> Result<Self> {
        let source = Source::client(&client.organization_name, &client.name);
        Self::new(schema, rows, vec![source], None)
    }

    pub fn for_test(schema: Arc<Schema>, rows: Vec<Vec<String>>) -> Result<Self> {
        Self::new(schema, rows, vec![Source::Test], None)
    }

    pub(crate) fn from_parts(
        schema: Arc<Schema>,
        table: DataFrame,
        sources: Vec<Source>,
        destination: Option<Arc<OrganizationService>>,
    ) -> Self {
        Self {
            id: ReportId::new(),
            schema,
            sources,
            destination,
            created_at: Utc::now(),
            table,
        }
    }

    /// A new report over `table` derived from this one by `action`.
    pub(crate) fn derive(&self, schema: Arc<Schema>, table: DataFrame, action: &str) -> Self {
        let derived = Self::from_parts(
            schema,
            table,
            vec![Source::derived(self.id, action)],
            self.destination.clone(),
        );
        debug!(
            from = %self.id,
            to = %derived.id,
            action,
            rows = derived.row_count(),
            "derived report"
        );
        derived
    }

    pub fn id(&self) -> ReportId {
        self.id
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn destination(&self) -> Option<&Arc<OrganizationService>> {
        self.destination.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The backing table. Columns are in schema element order.
    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    /// `<schema base name>-<id>-<created timestamp>`
    pub fn name(&self) -> String {
        format!(
            "{}-{}-{}",
            self.schema.base_name(),
            self.id,
            self.created_at.format(NAME_TIMESTAMP_FORMAT)
        )
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn row_count(&self) -> usize {
        self.table.height()
    }

    pub fn item_count(&self) -> usize {
        self.row_count()
    }

    /// The value at `row` in `column`, or `None` if either is out of range.
    pub fn get_string(&self, row: usize, column: &str) -> Option<&str> {
        if row >= self.row_count() || !self.schema.contains_element(column) {
            return None;
        }
        str_values(&self.table, column).ok()?.get(row)
    }

    /// Like [`Report::get_string`], with blank values replaced by `default`.
    pub fn get_string_with_default<'a>(
        &'a self,
        row: usize,
        column: &str,
        default: &'a str,
    ) -> &'a str {
        match self.get_string(row, column) {
            Some(value) if !value.is_empty() => value,
            _ => default,
        }
    }

    pub fn column_values(&self, column: &str) -> Result<Vec<&str>> {
        Ok(self
            .column(column)?
            .into_iter()
            .map(|value| value.unwrap_or(""))
            .collect())
    }

    /// Row-major copy of every value.
    pub fn rows(&self) -> Result<Vec<Vec<String>>> {
        let columns = self
            .schema
            .element_names()
            .map(|name| self.column(name))
            .collect::<Result<Vec<_>>>()?;
        Ok((0..self.row_count())
            .map(|row| {
                columns
                    .iter()
                    .map(|column| column.get(row).unwrap_or("").to_string())
                    .collect()
            })
            .collect())
    }

    pub(crate) fn column(&self, name: &str) -> Result<&StringChunked> {
        if !self.schema.contains_element(name) {
            return Err(SchemaError::UnknownElement {
                schema: self.schema.name.clone(),
                element: name.to_string(),
            }
            .into());
        }
        str_values(&self.table, name)
    }

    /// Same rows, addressed to `destination`.
    pub fn copy(&self, destination: Option<Arc<OrganizationService>>) -> Report {
        let mut copy = self.derive(Arc::clone(&self.schema), self.table.clone(), COPY_ACTION);
        copy.destination = destination;
        copy
    }

    #[must_use]
    pub fn with_destination(mut self, destination: Arc<OrganizationService>) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Keep rows where every `(column, pattern)` finds a match in the column's value.
    pub fn filter<C, P>(&self, patterns: &[(C, P)]) -> Result<Report>
    where
        C: AsRef<str>,
        P: AsRef<str>,
    {
        let mut predicates = Vec::with_capacity(patterns.len());
        for (column, pattern) in patterns {
            let column = column.as_ref();
            if !self.schema.contains_element(column) {
                return Err(SchemaError::UnknownElement {
                    schema: self.schema.name.clone(),
                    element: column.to_string(),
                }
                .into());
            }
            predicates.push(RowPredicate::Matches {
                column: column.to_string(),
                pattern: compile_pattern(pattern.as_ref())?,
            });
        }
        self.filter_by_predicate(&RowPredicate::All(predicates))
    }

    /// Keep rows the predicate selects. Columns the schema lacks read as empty.
    pub fn filter_by_predicate(&self, predicate: &RowPredicate) -> Result<Report> {
        let mut columns: BTreeMap<&str, &StringChunked> = BTreeMap::new();
        for name in predicate.columns() {
            if self.schema.contains_element(name) {
                columns.insert(name, str_values(&self.table, name)?);
            }
        }
        let keep: Vec<bool> = (0..self.row_count())
            .map(|row| {
                predicate.evaluate(&|column: &str| {
                    columns.get(column).and_then(|values| values.get(row))
                })
            })
            .collect();
        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        let table = self.table.filter(&mask).map_err(frame_error)?;
        Ok(self.derive(Arc::clone(&self.schema), table, FILTER_ACTION))
    }

    /// Replace every PII column with its element default.
    pub fn deidentify(&self) -> Result<Report> {
        let mut table = self.table.clone();
        let height = self.row_count();
        for element in self.schema.elements.iter().filter(|element| element.is_pii()) {
            table
                .with_column(constant_column(&element.name, element.default_value(), height))
                .map_err(frame_error)?;
        }
        Ok(self.derive(Arc::clone(&self.schema), table, DEIDENTIFY_ACTION))
    }

    /// Concatenate reports of one schema, in order.
    pub fn merge(reports: Vec<Report>) -> Result<Report> {
        let mut reports = reports.into_iter();
        let Some(first) = reports.next() else {
            return Err(RoutingError::EmptyMerge.into());
        };
        let rest: Vec<Report> = reports.collect();
        if rest.is_empty() {
            return Ok(first);
        }

        let mut table = first.table.clone();
        let mut sources = vec![Source::derived(first.id, MERGE_ACTION)];
        for report in &rest {
            if report.schema != first.schema {
                return Err(RoutingError::SchemaMismatch {
                    expected: first.schema.name.clone(),
                    found: report.schema.name.clone(),
                }
                .into());
            }
            table.vstack_mut(&report.table).map_err(frame_error)?;
            sources.push(Source::derived(report.id, MERGE_ACTION));
        }

        let merged = Self::from_parts(
            Arc::clone(&first.schema),
            table,
            sources,
            first.destination.clone(),
        );
        debug!(
            id = %merged.id,
            inputs = rest.len() + 1,
            rows = merged.row_count(),
            "merged reports"
        );
        Ok(merged)
    }
}
