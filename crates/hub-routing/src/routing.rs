//! Fan a report out to the services that should receive it.
//!
//! Each candidate service gets its own filtered, mapped and possibly
//! de-identified copy. Reports are immutable, so services are routed in
//! parallel with no shared mutation.

use std::sync::Arc;

use hub_metadata::{MetadataCatalog, build_mapping};
use hub_model::{OrganizationService, Result, SchemaError};
use hub_report::Report;
use rayon::prelude::*;
use tracing::{debug, info, info_span};

/// A report prepared for one service.
#[derive(Debug, Clone)]
pub struct RoutedReport {
    pub report: Report,
    pub service: Arc<OrganizationService>,
}

/// Route `report` to every service in the catalog.
pub fn route_to_all(report: &Report, catalog: &MetadataCatalog) -> Result<Vec<RoutedReport>> {
    let services: Vec<&OrganizationService> = catalog.services().collect();
    filter_and_map_by_service(report, &services, catalog)
}

/// One routed report per service whose filters select at least one row.
///
/// Only services on the report's topic are considered. Results keep the
/// order of `services`. Every routed report is derived from `report`, so
/// each has its own id. Any metadata defect fails the whole call.
pub fn filter_and_map_by_service(
    report: &Report,
    services: &[&OrganizationService],
    catalog: &MetadataCatalog,
) -> Result<Vec<RoutedReport>> {
    if report.is_empty() {
        debug!(report = %report.id(), "nothing to route");
        return Ok(Vec::new());
    }
    let topic = report.schema().topic.as_str();
    let candidates: Vec<&OrganizationService> = services
        .iter()
        .copied()
        .filter(|service| service.topic == topic)
        .collect();

    let routed: Vec<Option<RoutedReport>> = candidates
        .par_iter()
        .map(|service| route_one(report, service, catalog))
        .collect::<Result<_>>()?;
    let routed: Vec<RoutedReport> = routed.into_iter().flatten().collect();

    info!(
        report = %report.id(),
        candidates = candidates.len(),
        routed = routed.len(),
        "routed report"
    );
    Ok(routed)
}

fn route_one(
    report: &Report,
    service: &OrganizationService,
    catalog: &MetadataCatalog,
) -> Result<Option<RoutedReport>> {
    let span = info_span!("route", service = %service.full_name());
    let _entered = span.enter();

    let filtered = match catalog.service_predicate(service)? {
        Some(predicate) => report.filter_by_predicate(&predicate)?,
        None => report.copy(None),
    };
    if filtered.is_empty() {
        debug!("no rows pass the jurisdictional filters");
        return Ok(None);
    }

    let schema = catalog
        .find_schema(&service.schema)
        .ok_or_else(|| SchemaError::UnknownSchema {
            schema: service.schema.clone(),
        })?;
    let mapped = if filtered.schema() == schema {
        filtered
    } else {
        let mapping = build_mapping(filtered.schema(), schema, catalog)?;
        filtered.apply_mapping(&mapping, catalog)?
    };
    let prepared = if service.transforms.deidentify {
        mapped.deidentify()?
    } else {
        mapped
    };

    let service = Arc::new(service.clone());
    debug!(rows = prepared.row_count(), "prepared report for service");
    Ok(Some(RoutedReport {
        report: prepared.with_destination(Arc::clone(&service)),
        service,
    }))
}
