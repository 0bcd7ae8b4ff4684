//! Reports: immutable tables of rows for one schema.
//!
//! A [`Report`] is backed by a polars `DataFrame` of string columns named for
//! the schema's elements. Filtering, de-identification, mapping and merging
//! each return a new report that records where it came from.

mod frame;
pub mod ingest;
pub mod mapping;
pub mod output;
pub mod report;

pub use ingest::{IngestOutcome, RecordIngestor};
pub use output::FormattedRows;
pub use report::Report;
