//! Catalog loading from parsed metadata documents.

use hub_metadata::{CatalogBuilder, FieldSource, build_mapping};
use hub_model::{ElementType, Organization, Schema, ValueSet};

const SCHEMAS: &str = r#"[
    {
        "name": "covid-19",
        "topic": "covid-19",
        "elements": [
            { "name": "patient_last_name", "type": "PERSON_NAME", "pii": true,
              "documentation": "The patient's last name" },
            { "name": "patient_state", "type": "STATE", "required": true },
            { "name": "patient_county", "type": "COUNTY" },
            { "name": "patient_zip_code", "type": "POSTAL_CODE" },
            { "name": "test_result", "type": "CODE", "value_set": "covid-19/test_result" }
        ]
    },
    {
        "name": "az/pima-az-covid-19",
        "topic": "covid-19",
        "based_on": "covid-19",
        "elements": [
            { "name": "patient_state",
              "csv_fields": [{ "name": "Patient_State" }] },
            { "name": "test_result", "csv_fields": [{ "name": "Result", "format": "$display" }] }
        ]
    },
    {
        "name": "pdi-covid-19",
        "topic": "covid-19",
        "extends": "covid-19",
        "elements": [
            { "name": "covid-19.patient_last_name" },
            { "name": "patient_initials", "mapper": "middleInitial(patient_last_name)" }
        ]
    }
]"#;

const VALUE_SETS: &str = r#"[
    {
        "name": "covid-19/test_result",
        "system": "SNOMED_CT",
        "values": [
            { "code": "260373001", "display": "Detected" },
            { "code": "260415000", "display": "Not detected" }
        ]
    }
]"#;

const ORGANIZATIONS: &str = r#"[
    {
        "name": "phd1",
        "description": "Arizona PHD",
        "services": [
            {
                "name": "elr",
                "topic": "covid-19",
                "schema": "az/pima-az-covid-19",
                "jurisdictional_filter": ["filterByCounty(AZ, Pima)"],
                "transforms": { "deidentify": false },
                "batch": {
                    "operation": "MERGE",
                    "number_per_day": 24,
                    "initial_batch": "00:00",
                    "time_zone": "ARIZONA"
                },
                "address": "phd1",
                "format": "CSV"
            }
        ],
        "clients": [
            { "name": "sender", "topic": "covid-19", "schema": "covid-19", "format": "CSV" }
        ]
    }
]"#;

fn load() -> hub_metadata::MetadataCatalog {
    let schemas: Vec<Schema> = serde_json::from_str(SCHEMAS).unwrap();
    let value_sets: Vec<ValueSet> = serde_json::from_str(VALUE_SETS).unwrap();
    let organizations: Vec<Organization> = serde_json::from_str(ORGANIZATIONS).unwrap();
    CatalogBuilder::new()
        .with_schemas(schemas)
        .with_value_sets(value_sets)
        .with_organizations(organizations)
        .build()
        .unwrap()
}

#[test]
fn based_on_schema_inherits_types() {
    let catalog = load();
    let pima = catalog.find_schema("AZ/Pima-AZ-COVID-19").unwrap();

    assert_eq!(pima.base_name(), "pima-az-covid-19");
    assert_eq!(pima.elements.len(), 2);
    let state = pima.find_element("patient_state").unwrap();
    assert_eq!(state.element_type(), ElementType::State);
    assert!(state.is_required());
    assert_eq!(state.primary_csv_field().unwrap().name, "Patient_State");
    let result = pima.find_element("test_result").unwrap();
    assert_eq!(result.value_set.as_deref(), Some("covid-19/test_result"));
}

#[test]
fn extended_schema_keeps_dotted_element_and_appends_the_rest() {
    let catalog = load();
    let pdi = catalog.find_schema("pdi-covid-19").unwrap();

    let last_name = pdi.find_element("covid-19.patient_last_name").unwrap();
    assert!(last_name.documentation.is_some());
    assert!(last_name.is_pii());

    let names: Vec<&str> = pdi.element_names().collect();
    assert_eq!(
        names,
        vec![
            "covid-19.patient_last_name",
            "patient_initials",
            "patient_last_name",
            "patient_state",
            "patient_county",
            "patient_zip_code",
            "test_result",
        ]
    );
}

#[test]
fn services_and_clients_by_qualified_name() {
    let catalog = load();
    let service = catalog.find_service("phd1.elr").unwrap();
    assert_eq!(service.jurisdictional_filter.len(), 1);
    assert!(service.batch.as_ref().unwrap().is_valid());
    assert_eq!(catalog.find_client("phd1.sender").unwrap().name, "sender");
    assert_eq!(catalog.services().count(), 1);
    assert!(catalog.service_predicate(service).unwrap().is_some());
}

#[test]
fn mapping_between_loaded_schemas() {
    let catalog = load();
    let standard = catalog.find_schema("covid-19").unwrap();
    let pdi = catalog.find_schema("pdi-covid-19").unwrap();

    let mapping = build_mapping(standard, pdi, &catalog).unwrap();
    assert!(matches!(
        mapping.source_of("patient_initials"),
        FieldSource::Mapper(_)
    ));
    assert!(matches!(
        mapping.source_of("covid-19.patient_last_name"),
        FieldSource::Default
    ));
    assert!(matches!(
        mapping.source_of("patient_state"),
        FieldSource::Direct("patient_state")
    ));
    assert!(mapping.is_complete());
}
