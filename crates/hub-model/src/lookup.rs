//! Lookup tables used by TABLE elements and the `lookup` mapper.

use std::io::Read;

use crate::error::{HubError, Result};

/// A small in-memory table with a header row.
///
/// Column names and index values compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl LookupTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Read a table from CSV text; the first record is the header.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader
            .headers()
            .map_err(|error| HubError::internal(format!("lookup table header: {error}")))?
            .iter()
            .map(str::to_string)
            .collect();
        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record =
                record.map_err(|error| HubError::internal(format!("lookup table row: {error}")))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(column))
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Value of `lookup_column` in the first row whose `index_column` equals `index_value`.
    pub fn lookup_value(
        &self,
        index_column: &str,
        index_value: &str,
        lookup_column: &str,
    ) -> Option<&str> {
        let index = self.column_index(index_column)?;
        let lookup = self.column_index(lookup_column)?;
        self.rows
            .iter()
            .find(|row| {
                row.get(index)
                    .is_some_and(|value| value.eq_ignore_ascii_case(index_value))
            })
            .and_then(|row| row.get(lookup))
            .map(String::as_str)
    }
}
