//! Round-trip properties of element normalization.

use chrono::NaiveDate;
use hub_model::{Element, ElementType, SetSystem, UsTimeZone, ValueSet, ValueSetValue};
use hub_transform::FieldContext;
use hub_transform::formats::{ZIP_FIVE_PLUS_FOUR_TOKEN, ZIP_FIVE_TOKEN};
use proptest::prelude::*;

fn value_sets() -> Vec<ValueSet> {
    vec![
        ValueSet::new("covid-19/test_result", SetSystem::SnomedCt).with_values(vec![
            ValueSetValue::new("260373001", "Detected"),
            ValueSetValue::new("260415000", "Not detected"),
        ]),
    ]
}

proptest! {
    #[test]
    fn date_round_trip_is_identity(days in 0u64..80_000) {
        let sets: Vec<ValueSet> = Vec::new();
        let context = FieldContext::new(&sets);
        let element = Element::typed("specimen_collection_date", ElementType::Date);
        let date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap() + chrono::Days::new(days);
        let canonical = date.format("%Y%m%d").to_string();

        let normalized = context.to_normalized(&element, &canonical, None).unwrap();
        let formatted = context.to_formatted(&element, &normalized, None).unwrap();
        prop_assert_eq!(formatted, canonical);
    }

    #[test]
    fn telephone_default_template_has_no_separators(
        area in 2u32..=9,
        area_rest in 0u32..=99,
        exchange in 2u32..=9,
        exchange_rest in 0u32..=99,
        subscriber in 0u32..=9999,
    ) {
        let sets: Vec<ValueSet> = Vec::new();
        let context = FieldContext::new(&sets);
        let element = Element::typed("patient_phone_number", ElementType::Telephone);
        let area = format!("{area}{area_rest:02}");
        let exchange = format!("{exchange}{exchange_rest:02}");
        let subscriber = format!("{subscriber:04}");
        let input = format!("({area}) {exchange}-{subscriber}");

        let normalized = context.to_normalized(&element, &input, None).unwrap();
        let formatted = context.to_formatted(&element, &normalized, None).unwrap();
        prop_assert_eq!(formatted, format!("{area}{exchange}{subscriber}"));
    }

    #[test]
    fn zip_plus_four_projections(five in 0u32..=99_999, four in 0u32..=9_999) {
        let sets: Vec<ValueSet> = Vec::new();
        let context = FieldContext::new(&sets);
        let element = Element::typed("patient_zip_code", ElementType::PostalCode);
        let input = format!("{five:05}-{four:04}");

        let normalized = context.to_normalized(&element, &input, None).unwrap();
        let zip5 = context.to_formatted(&element, &normalized, Some(ZIP_FIVE_TOKEN)).unwrap();
        let zip9 = context
            .to_formatted(&element, &normalized, Some(ZIP_FIVE_PLUS_FOUR_TOKEN))
            .unwrap();
        prop_assert_eq!(zip5, format!("{five:05}"));
        prop_assert_eq!(zip9, input);
    }
}

#[test]
fn code_round_trip_through_display() {
    let sets = value_sets();
    let context = FieldContext::new(&sets);
    let element = Element::typed("test_result", ElementType::Code)
        .with_value_set("covid-19/test_result");

    let code = context
        .to_normalized(&element, "not detected", Some("$display"))
        .unwrap();
    assert_eq!(code, "260415000");
    assert_eq!(
        context.to_formatted(&element, &code, Some("$display")).unwrap(),
        "Not detected"
    );
    assert_eq!(context.to_formatted(&element, &code, Some("$system")).unwrap(), "SCT");
}

#[test]
fn datetime_uses_configured_reference_zone() {
    let sets: Vec<ValueSet> = Vec::new();
    let element = Element::typed("order_test_date", ElementType::Datetime);

    let central = FieldContext::new(&sets);
    let hawaii = FieldContext::new(&sets).with_reference_zone(UsTimeZone::Hawaii);
    assert_eq!(
        central.to_normalized(&element, "20210301", None).unwrap(),
        "202103010000-0600"
    );
    assert_eq!(
        hawaii.to_normalized(&element, "20210301", None).unwrap(),
        "202103010000-1000"
    );
}

#[test]
fn datetime_output_pattern() {
    let sets: Vec<ValueSet> = Vec::new();
    let context = FieldContext::new(&sets);
    let element = Element::typed("order_test_date", ElementType::Datetime);
    assert_eq!(
        context
            .to_formatted(&element, "202103011545-0600", Some("M/d/yyyy HH:mm"))
            .unwrap(),
        "3/1/2021 15:45"
    );
}
