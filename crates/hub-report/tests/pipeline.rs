//! Ingest, project and render a report end to end.

use std::sync::Arc;

use hub_metadata::{CatalogBuilder, MetadataCatalog, build_mapping};
use hub_model::{
    Element, ElementType, EngineOptions, Schema, SetSystem, Source, UsTimeZone, ValueSet,
    ValueSetValue,
};
use hub_report::{RecordIngestor, Report};
use hub_transform::FieldContext;

fn catalog() -> MetadataCatalog {
    let standard = Schema::new(
        "covid-19",
        "covid-19",
        vec![
            Element::typed("patient_last_name", ElementType::PersonName)
                .with_pii(true)
                .with_csv_field("Last Name", None),
            Element::typed("patient_state", ElementType::State).with_csv_field("State", None),
            Element::typed("specimen_collection_date_time", ElementType::Datetime)
                .with_csv_field("Collected", Some("M/d/yyyy")),
            Element::typed("test_result", ElementType::Code)
                .with_value_set("covid-19/test_result")
                .with_csv_field("Result", Some("$display")),
        ],
    );
    let receiver = Schema::new(
        "az/az-covid-19",
        "covid-19",
        vec![
            Element::new("patient_last_name"),
            Element::new("patient_initial").with_mapper("middleInitial(patient_last_name)"),
            Element::new("test_result"),
            Element::new("specimen_collection_date_time")
                .with_csv_field("Collected", Some("yyyy-MM-dd HH:mm")),
            Element::new("patient_state")
                .with_csv_field("State", None)
                .with_default("AZ"),
        ],
    )
    .with_based_on("covid-19");
    let results = ValueSet::new("covid-19/test_result", SetSystem::SnomedCt).with_values(vec![
        ValueSetValue::new("260373001", "Detected"),
        ValueSetValue::new("260415000", "Not detected"),
    ]);

    CatalogBuilder::new()
        .with_schemas([standard, receiver])
        .with_value_sets([results])
        .build()
        .unwrap()
}

fn header() -> Vec<String> {
    ["Last Name", "State", "Collected", "Result"]
        .iter()
        .map(|name| (*name).to_string())
        .collect()
}

fn row(values: [&str; 4]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

#[test]
fn ingest_filter_map_and_render() {
    let catalog = catalog();
    let options = EngineOptions::new().with_reference_time_zone(UsTimeZone::Arizona);
    let ingestor = RecordIngestor::new(&catalog).with_options(options);
    let standard = Arc::clone(catalog.find_schema("covid-19").unwrap());

    let outcome = ingestor
        .ingest_formatted(
            standard,
            &header(),
            vec![
                row(["smith", "AZ", "7/5/2020", "Detected"]),
                row(["jones", "FL", "7/6/2020", "Not detected"]),
                row(["brown", "AZ", "someday", "Detected"]),
            ],
            Source::client("lab", "sender"),
        )
        .unwrap();
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].row, 2);

    let arizona = outcome.report.filter(&[("patient_state", "^AZ$")]).unwrap();
    assert_eq!(arizona.row_count(), 1);

    let receiver = catalog.find_schema("az/az-covid-19").unwrap();
    let mapping = build_mapping(arizona.schema(), receiver, &catalog).unwrap();
    let mapped = arizona.apply_mapping(&mapping, &catalog).unwrap();
    assert_eq!(mapped.get_string(0, "patient_initial"), Some("S"));
    assert_eq!(
        mapped.get_string(0, "specimen_collection_date_time"),
        Some("202007050000-0700")
    );

    let clean = mapped.deidentify().unwrap();
    assert_eq!(clean.get_string(0, "patient_last_name"), Some(""));

    let context = FieldContext::with_options(&catalog, &options);
    let output = clean.formatted_rows(&context).unwrap();
    insta::assert_snapshot!(output.header.join("|"), @"Last Name|Result|Collected|State");
    insta::assert_snapshot!(output.rows[0].join("|"), @"|Detected|2020-07-05 00:00|AZ");
    assert!(clean.validate(&context).unwrap().is_empty());
}

#[test]
fn merge_batches_of_the_same_schema() {
    let catalog = catalog();
    let ingestor = RecordIngestor::new(&catalog);
    let schema = Arc::clone(catalog.find_schema("covid-19").unwrap());
    let batch = |names: &[&str]| {
        ingestor
            .ingest(
                Arc::clone(&schema),
                names
                    .iter()
                    .map(|name| row([*name, "AZ", "20200705", "260373001"]))
                    .collect(),
                Source::Test,
            )
            .unwrap()
    };

    let merged = Report::merge(vec![batch(&["a", "b"]), batch(&["c", "d", "e"])]).unwrap();
    assert_eq!(merged.row_count(), 5);
    assert_eq!(
        merged.column_values("patient_last_name").unwrap(),
        vec!["a", "b", "c", "d", "e"]
    );
    assert_eq!(merged.sources().len(), 2);
}
