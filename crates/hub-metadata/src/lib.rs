//! Metadata catalog for the report routing hub.
//!
//! Loads schemas, value sets, organizations, lookup tables, mappers and
//! jurisdictional filters once, resolves schema inheritance, and answers
//! lookups for the rest of the pipeline.

pub mod catalog;
pub mod expr;
pub mod filters;
pub mod mappers;
pub mod mapping;
pub mod resolve;

pub use catalog::{CatalogBuilder, MetadataCatalog};
pub use expr::{CallExpression, parse_call};
pub use filters::JurisdictionalFilter;
pub use mappers::{Mapper, MapperContext, MapperInput};
pub use mapping::{FieldSource, MapperCall, SchemaMapping, build_mapping};
pub use resolve::resolve_schemas;
