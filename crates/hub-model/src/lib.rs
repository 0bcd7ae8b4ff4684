//! Data model for the report routing hub.
//!
//! - **element**: typed field definitions and attribute inheritance
//! - **schema**: ordered element collections per topic
//! - **value_set**: code/display catalogs for CODE elements
//! - **organization**: senders (clients) and receivers (services)
//! - **batch**: receiver batch policy and delivery scheduling
//! - **predicate**: row selection shared by filters
//! - **error**: schema / validation / routing error taxonomy

pub mod batch;
pub mod element;
pub mod error;
pub mod lookup;
pub mod options;
pub mod organization;
pub mod predicate;
pub mod provenance;
pub mod redact;
pub mod schema;
pub mod value_set;

pub use batch::{Batch, BatchOperation, UsTimeZone};
pub use element::{CsvField, Element, ElementType, HdFields};
pub use error::{HubError, Result, RoutingError, RowError, SchemaError, ValidationError};
pub use lookup::LookupTable;
pub use options::{EngineOptions, RowErrorPolicy};
pub use organization::{
    Format, Organization, OrganizationClient, OrganizationService, Transforms,
    parse_qualified_name,
};
pub use predicate::RowPredicate;
pub use provenance::{ReportId, Source};
pub use schema::Schema;
pub use value_set::{SetSystem, ValueSet, ValueSetSource, ValueSetValue};
