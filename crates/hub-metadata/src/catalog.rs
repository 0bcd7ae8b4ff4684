//! The metadata catalog.
//!
//! A [`CatalogBuilder`] collects already-parsed schemas, value sets,
//! organizations, lookup tables, mappers and filters; [`CatalogBuilder::build`]
//! resolves and validates them into an immutable [`MetadataCatalog`]. Share
//! the catalog behind an `Arc` once built; it is never mutated afterwards.
//!
//! All lookups ignore case.

use std::collections::BTreeMap;
use std::sync::Arc;

use hub_model::{
    Element, HubError, LookupTable, Organization, OrganizationClient, OrganizationService,
    Result, RowPredicate, Schema, SchemaError, ValueSet, ValueSetSource, parse_qualified_name,
};
use tracing::{debug, info, warn};

use crate::expr::parse_call;
use crate::filters::{DoesNotMatch, FilterByCounty, JurisdictionalFilter, Matches};
use crate::mappers::{
    ConcatenateMapper, IfPresentMapper, LookupMapper, Mapper, MiddleInitialMapper, UseMapper,
};
use crate::resolve::{resolve_schemas, schema_key};

fn key(name: &str) -> String {
    name.to_lowercase()
}

pub struct MetadataCatalog {
    schemas: BTreeMap<String, Arc<Schema>>,
    value_sets: BTreeMap<String, ValueSet>,
    organizations: Vec<Organization>,
    lookup_tables: BTreeMap<String, LookupTable>,
    mappers: BTreeMap<String, Arc<dyn Mapper>>,
    filters: BTreeMap<String, Arc<dyn JurisdictionalFilter>>,
}

impl std::fmt::Debug for MetadataCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCatalog")
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .field("value_sets", &self.value_sets.keys().collect::<Vec<_>>())
            .field("organizations", &self.organizations.len())
            .field("lookup_tables", &self.lookup_tables.keys().collect::<Vec<_>>())
            .field("mappers", &self.mappers.keys().collect::<Vec<_>>())
            .field("filters", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MetadataCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    pub fn find_schema(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(&schema_key(name))
    }

    pub fn schemas(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.values()
    }

    pub fn find_value_set(&self, name: &str) -> Option<&ValueSet> {
        self.value_sets.get(&key(name))
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    pub fn find_organization(&self, name: &str) -> Option<&Organization> {
        if name.trim().is_empty() {
            return None;
        }
        self.organizations
            .iter()
            .find(|organization| organization.name.eq_ignore_ascii_case(name))
    }

    /// Every service of every organization, in load order.
    pub fn services(&self) -> impl Iterator<Item = &OrganizationService> {
        self.organizations
            .iter()
            .flat_map(|organization| organization.services.iter())
    }

    pub fn clients(&self) -> impl Iterator<Item = &OrganizationClient> {
        self.organizations
            .iter()
            .flat_map(|organization| organization.clients.iter())
    }

    /// Find a service by `org.service`; a bare `org` means `org.default`.
    pub fn find_service(&self, name: &str) -> Option<&OrganizationService> {
        let (organization, service) = parse_qualified_name(name)?;
        self.find_organization(organization)?.find_service(service)
    }

    pub fn find_client(&self, name: &str) -> Option<&OrganizationClient> {
        let (organization, client) = parse_qualified_name(name)?;
        self.find_organization(organization)?.find_client(client)
    }

    pub fn find_lookup_table(&self, name: &str) -> Option<&LookupTable> {
        self.lookup_tables.get(&key(name))
    }

    pub fn find_mapper(&self, name: &str) -> Option<&Arc<dyn Mapper>> {
        self.mappers.get(&key(name))
    }

    pub fn find_filter(&self, name: &str) -> Option<&Arc<dyn JurisdictionalFilter>> {
        self.filters.get(&key(name))
    }

    /// The AND of a service's jurisdictional filters, or `None` if it has none.
    pub fn service_predicate(&self, service: &OrganizationService) -> Result<Option<RowPredicate>> {
        let mut predicates = Vec::with_capacity(service.jurisdictional_filter.len());
        for expression in &service.jurisdictional_filter {
            let call = parse_call(expression)?;
            let filter = self
                .find_filter(&call.name)
                .ok_or_else(|| SchemaError::UnknownFilter {
                    filter: call.name.clone(),
                })?;
            predicates.push(filter.predicate(&call.args)?);
        }
        Ok(match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(RowPredicate::All(predicates)),
        })
    }

    fn validate_element(&self, element: &Element) -> Result<()> {
        if let Some(value_set) = element.value_set.as_deref()
            && self.find_value_set(value_set).is_none()
        {
            return Err(SchemaError::UnknownValueSet {
                element: element.name.clone(),
                value_set: value_set.to_string(),
            }
            .into());
        }
        if element.is_code_type()
            && element.value_set.is_none()
            && element.alt_values.is_none()
            && !element.written_without_source()
        {
            return Err(SchemaError::CodeWithoutValues {
                element: element.name.clone(),
            }
            .into());
        }
        if let Some(table) = element.table.as_deref()
            && self.find_lookup_table(table).is_none()
        {
            return Err(SchemaError::UnknownLookupTable {
                table: table.to_string(),
            }
            .into());
        }
        if let Some(expression) = element.mapper.as_deref() {
            let call = parse_call(expression)?;
            let mapper = self
                .find_mapper(&call.name)
                .ok_or_else(|| SchemaError::UnknownMapper {
                    element: element.name.clone(),
                    mapper: call.name.clone(),
                })?;
            mapper
                .element_names(element, &call.args)
                .map_err(|reason| SchemaError::InvalidMapperArgs {
                    element: element.name.clone(),
                    mapper: call.name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    fn validate_service(&self, service: &OrganizationService) -> Result<()> {
        if let Some(batch) = &service.batch {
            batch
                .validate()
                .map_err(|reason| SchemaError::InvalidBatch {
                    service: service.full_name(),
                    reason,
                })?;
        }
        self.service_predicate(service)?;
        Ok(())
    }
}

impl ValueSetSource for MetadataCatalog {
    fn find_value_set(&self, name: &str) -> Option<&ValueSet> {
        MetadataCatalog::find_value_set(self, name)
    }
}

/// Collects metadata for one load.
///
/// The built-in mappers and filters are registered up front; registering
/// another with the same name replaces it.
pub struct CatalogBuilder {
    schemas: Vec<Schema>,
    value_sets: Vec<ValueSet>,
    organizations: Vec<Organization>,
    lookup_tables: Vec<(String, LookupTable)>,
    mappers: Vec<Arc<dyn Mapper>>,
    filters: Vec<Arc<dyn JurisdictionalFilter>>,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            schemas: Vec::new(),
            value_sets: Vec::new(),
            organizations: Vec::new(),
            lookup_tables: Vec::new(),
            mappers: vec![
                Arc::new(MiddleInitialMapper),
                Arc::new(UseMapper),
                Arc::new(IfPresentMapper),
                Arc::new(LookupMapper),
                Arc::new(ConcatenateMapper),
            ],
            filters: vec![
                Arc::new(FilterByCounty),
                Arc::new(Matches),
                Arc::new(DoesNotMatch),
            ],
        }
    }

    #[must_use]
    pub fn with_schemas(mut self, schemas: impl IntoIterator<Item = Schema>) -> Self {
        self.schemas.extend(schemas);
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schemas.push(schema);
        self
    }

    #[must_use]
    pub fn with_value_sets(mut self, value_sets: impl IntoIterator<Item = ValueSet>) -> Self {
        self.value_sets.extend(value_sets);
        self
    }

    #[must_use]
    pub fn with_organizations(
        mut self,
        organizations: impl IntoIterator<Item = Organization>,
    ) -> Self {
        self.organizations.extend(organizations);
        self
    }

    #[must_use]
    pub fn with_lookup_table(mut self, name: impl Into<String>, table: LookupTable) -> Self {
        self.lookup_tables.push((name.into(), table));
        self
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: Arc<dyn Mapper>) -> Self {
        self.mappers.push(mapper);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Arc<dyn JurisdictionalFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Resolve and validate everything collected.
    ///
    /// Any defect fails the whole load with a [`HubError::Load`] naming the
    /// offending entry.
    pub fn build(self) -> Result<MetadataCatalog> {
        let mut value_sets = BTreeMap::new();
        for set in self.value_sets {
            if let Some(previous) = value_sets.insert(key(&set.name), set) {
                warn!(value_set = %previous.name, "value set loaded twice, keeping the last");
            }
        }

        let lookup_tables: BTreeMap<String, LookupTable> = self
            .lookup_tables
            .into_iter()
            .map(|(name, table)| (key(&name), table))
            .collect();

        let mappers: BTreeMap<String, Arc<dyn Mapper>> = self
            .mappers
            .into_iter()
            .map(|mapper| (key(mapper.name()), mapper))
            .collect();
        let filters: BTreeMap<String, Arc<dyn JurisdictionalFilter>> = self
            .filters
            .into_iter()
            .map(|filter| (key(filter.name()), filter))
            .collect();

        check_schema_names(&self.schemas)?;
        let schemas = resolve_schemas(&self.schemas)
            .map_err(|error| HubError::load("schema catalog", error))?;

        let mut organizations = self.organizations;
        for organization in &mut organizations {
            organization.link_members();
        }

        let catalog = MetadataCatalog {
            schemas: schemas
                .into_iter()
                .map(|schema| (schema_key(&schema.name), Arc::new(schema)))
                .collect(),
            value_sets,
            organizations,
            lookup_tables,
            mappers,
            filters,
        };

        for schema in catalog.schemas.values() {
            if schema.elements.is_empty() {
                return Err(HubError::load(
                    format!("schema '{}'", schema.name),
                    SchemaError::EmptySchema {
                        schema: schema.name.clone(),
                    },
                ));
            }
            for element in &schema.elements {
                catalog
                    .validate_element(element)
                    .map_err(|error| HubError::load(format!("schema '{}'", schema.name), error))?;
            }
        }
        for service in catalog.services() {
            catalog
                .validate_service(service)
                .map_err(|error| HubError::load(format!("service '{}'", service.full_name()), error))?;
        }

        info!(
            schemas = catalog.schemas.len(),
            value_sets = catalog.value_sets.len(),
            organizations = catalog.organizations.len(),
            lookup_tables = catalog.lookup_tables.len(),
            "metadata catalog loaded"
        );
        debug!(catalog = ?catalog, "catalog contents");
        Ok(catalog)
    }
}

fn check_schema_names(schemas: &[Schema]) -> Result<()> {
    let mut seen = std::collections::BTreeSet::new();
    for schema in schemas {
        let entry = || format!("schema '{}'", schema.name);
        if !seen.insert(schema_key(&schema.name)) {
            return Err(HubError::load(
                entry(),
                SchemaError::DuplicateSchema {
                    schema: schema.name.clone(),
                },
            ));
        }
        if let Some(element) = schema.duplicate_element() {
            return Err(HubError::load(
                entry(),
                SchemaError::DuplicateElement {
                    schema: schema.name.clone(),
                    element: element.to_string(),
                },
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_model::{Batch, BatchOperation, ElementType, SetSystem, UsTimeZone};

    fn org() -> Organization {
        Organization::new(
            "phd1",
            vec![
                OrganizationService::new("elr", "test", "one")
                    .with_filters(vec!["matches(a, 1)".to_string()]),
            ],
            vec![OrganizationClient::new("default", "test", "one")],
        )
    }

    #[test]
    fn lookups_ignore_case_and_qualify_names() {
        let catalog = CatalogBuilder::new()
            .with_schema(Schema::new("One", "test", vec![Element::new("a")]))
            .with_value_sets([ValueSet::new("HL70136", SetSystem::Hl7)])
            .with_organizations([org()])
            .build()
            .unwrap();

        assert!(catalog.find_schema("one").is_some());
        assert!(catalog.find_value_set("hl70136").is_some());
        assert_eq!(catalog.find_service("PHD1.ELR").unwrap().full_name(), "phd1.elr");
        assert!(catalog.find_client("phd1").is_some());
        assert!(catalog.find_service("phd1.elr.x").is_none());
        assert!(catalog.find_service("").is_none());
        assert!(catalog.find_mapper("MIDDLEINITIAL").is_some());
        assert!(catalog.find_filter("filterbycounty").is_some());
    }

    #[test]
    fn service_predicate_ands_filters() {
        let mut service = OrganizationService::new("elr", "test", "one");
        let catalog = CatalogBuilder::new().build().unwrap();
        assert!(catalog.service_predicate(&service).unwrap().is_none());

        service.jurisdictional_filter = vec!["matches(a, 1)".into(), "doesNotMatch(b, 2)".into()];
        let predicate = catalog.service_predicate(&service).unwrap().unwrap();
        assert!(matches!(predicate, RowPredicate::All(ref all) if all.len() == 2));
    }

    #[test]
    fn load_errors_name_the_entry() {
        let duplicate = CatalogBuilder::new()
            .with_schemas([Schema::new("a", "t", vec![]), Schema::new("A", "t", vec![])])
            .build()
            .unwrap_err();
        assert!(duplicate.to_string().contains("schema 'A'"));

        let code = CatalogBuilder::new()
            .with_schema(Schema::new("a", "t", vec![Element::typed("c", ElementType::Code)]))
            .build()
            .unwrap_err();
        assert!(matches!(
            code,
            HubError::Load { ref source, .. }
                if matches!(**source, HubError::Schema(SchemaError::CodeWithoutValues { .. }))
        ));

        let unknown_set = CatalogBuilder::new()
            .with_schema(Schema::new(
                "a",
                "t",
                vec![Element::typed("c", ElementType::Code).with_value_set("nope")],
            ))
            .build();
        assert!(unknown_set.is_err());

        let mapper = CatalogBuilder::new()
            .with_schema(Schema::new("a", "t", vec![Element::new("c").with_mapper("guess(a)")]))
            .build()
            .unwrap_err();
        assert!(mapper.to_string().contains("guess"));
    }

    #[test]
    fn schema_without_elements_fails_the_load() {
        let error = CatalogBuilder::new()
            .with_schema(Schema::new("hollow", "t", vec![]))
            .build()
            .unwrap_err();
        assert!(matches!(
            error,
            HubError::Load { ref source, .. }
                if matches!(**source, HubError::Schema(SchemaError::EmptySchema { .. }))
        ));

        let base = Schema::new("base", "t", vec![Element::new("a")]);
        let child = Schema::new("child", "t", vec![]).with_extends("base");
        let catalog = CatalogBuilder::new().with_schemas([base, child]).build().unwrap();
        assert_eq!(catalog.find_schema("child").unwrap().elements.len(), 1);
    }

    #[test]
    fn code_element_filled_by_default_needs_no_values() {
        let catalog = CatalogBuilder::new()
            .with_schema(Schema::new(
                "a",
                "t",
                vec![Element::typed("c", ElementType::Code).with_default("Y")],
            ))
            .build();
        assert!(catalog.is_ok());
    }

    #[test]
    fn bad_batch_and_filter_fail_the_load() {
        let mut organization = org();
        organization.services[0].batch = Some(Batch::new(
            BatchOperation::Merge,
            7,
            "00:00",
            UsTimeZone::Arizona,
        ));
        let error = CatalogBuilder::new()
            .with_organizations([organization])
            .build()
            .unwrap_err();
        assert!(error.to_string().contains("phd1.elr"));

        let mut organization = org();
        organization.services[0].jurisdictional_filter = vec!["byZip(85705)".into()];
        let error = CatalogBuilder::new()
            .with_organizations([organization])
            .build()
            .unwrap_err();
        assert!(matches!(
            error,
            HubError::Load { ref source, .. }
                if matches!(**source, HubError::Schema(SchemaError::UnknownFilter { .. }))
        ));
    }
}
