//! Rendering a report for a downstream sender, and checking its values.

use hub_model::{HubError, Result, RowError, RowErrorPolicy, ValidationError};
use hub_transform::FieldContext;
use tracing::warn;

use crate::report::Report;

/// Header and rows as a sender would write them, one column per binding.
#[derive(Debug)]
pub struct FormattedRows {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows left out because a value could not be rendered.
    pub errors: Vec<RowError>,
}

impl FormattedRows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Report {
    /// Render every binding of every element with the binding's format.
    ///
    /// Elements without bindings are not written. A row with a value that
    /// cannot be rendered is handled per the context's [`RowErrorPolicy`];
    /// metadata defects always abort.
    pub fn formatted_rows(&self, context: &FieldContext<'_>) -> Result<FormattedRows> {
        let schema = self.schema();
        let mut header = Vec::new();
        let mut columns = Vec::new();
        for element in &schema.elements {
            if element.csv_fields().is_empty() {
                continue;
            }
            let values = self.column(&element.name)?;
            for field in element.csv_fields() {
                header.push(field.name.clone());
                columns.push((element, field.format.as_deref(), values));
            }
        }

        let mut rows = Vec::with_capacity(self.row_count());
        let mut errors = Vec::new();
        for row in 0..self.row_count() {
            let rendered = columns
                .iter()
                .map(|(element, format, column)| {
                    context.to_formatted(element, column.get(row).unwrap_or(""), *format)
                })
                .collect::<Result<Vec<String>>>();
            match rendered {
                Ok(values) => rows.push(values),
                Err(error @ HubError::Schema(_)) => return Err(error),
                Err(error) if context.row_errors() == RowErrorPolicy::FailFast => {
                    return Err(error);
                }
                Err(error) => {
                    warn!(report = %self.id(), row, %error, "row left out of output");
                    errors.push(RowError { row, error });
                }
            }
        }
        Ok(FormattedRows {
            header,
            rows,
            errors,
        })
    }

    /// Every value that is not well formed for its element type, and every
    /// blank required value.
    ///
    /// Metadata defects, such as a missing value set, abort the check.
    pub fn validate(&self, context: &FieldContext<'_>) -> Result<Vec<RowError>> {
        let schema = self.schema();
        let mut errors = Vec::new();
        for element in &schema.elements {
            let values = self.column(&element.name)?;
            for (row, value) in values.into_iter().enumerate() {
                let value = value.unwrap_or("");
                if value.trim().is_empty() {
                    if element.is_required() {
                        errors.push(RowError {
                            row,
                            error: ValidationError::new(
                                &element.name,
                                value,
                                "required value is blank",
                            )
                            .into(),
                        });
                    }
                    continue;
                }
                match context.check_normalized(element, value) {
                    Ok(()) => {}
                    Err(HubError::Schema(error)) => return Err(error.into()),
                    Err(HubError::Validation(error)) => errors.push(RowError {
                        row,
                        error: error.into(),
                    }),
                    Err(error) => errors.push(RowError {
                        row,
                        error: ValidationError::new(&element.name, value, error.to_string())
                            .into(),
                    }),
                }
            }
        }
        errors.sort_by_key(|error| error.row);
        Ok(errors)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use hub_model::{Element, ElementType, Schema, SetSystem, ValueSet, ValueSetValue};

    fn value_sets() -> Vec<ValueSet> {
        vec![
            ValueSet::new("hl70136", SetSystem::Hl7).with_values(vec![
                ValueSetValue::new("Y", "Yes"),
                ValueSetValue::new("N", "No"),
                ValueSetValue::new("UNK", "Unknown"),
            ]),
        ]
    }

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::new(
            "fl/fl-covid-19",
            "covid-19",
            vec![
                Element::typed("patient_phone", ElementType::Telephone)
                    .with_csv_field("Phone", Some("($area) $exchange-$subscriber")),
                Element::typed("pregnant", ElementType::Code)
                    .with_value_set("hl70136")
                    .with_csv_field("Pregnant", Some("$display"))
                    .with_csv_field("Pregnant_Code", None)
                    .with_csv_field("Pregnant_System", Some("$system")),
                Element::typed("collected", ElementType::Date)
                    .with_required(true)
                    .with_csv_field("Collected", Some("MM/dd/yyyy")),
                Element::new("internal_note"),
            ],
        ))
    }

    fn report(rows: &[[&str; 4]]) -> Report {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|value| (*value).to_string()).collect())
            .collect();
        Report::for_test(schema(), rows).unwrap()
    }

    #[test]
    fn renders_every_binding() {
        let sets = value_sets();
        let context = FieldContext::new(&sets);
        let report = report(&[
            ["5205551212:1:", "Y", "20200705", "x"],
            ["", "UNK", "20201231", ""],
        ]);

        let output = report.formatted_rows(&context).unwrap();
        insta::assert_snapshot!(
            output.header.join(","),
            @"Phone,Pregnant,Pregnant_Code,Pregnant_System,Collected"
        );
        insta::assert_snapshot!(
            output.rows[0].join(","),
            @"(520) 555-1212,Yes,Y,HL70136,07/05/2020"
        );
        insta::assert_snapshot!(output.rows[1].join(","), @",Unknown,UNK,NULLFL,12/31/2020");
    }

    #[test]
    fn unrenderable_rows_follow_the_row_policy() {
        let sets = value_sets();
        let report = report(&[
            ["5205551212:1:", "Y", "20200705", ""],
            ["555-1212", "N", "20200706", ""],
        ]);

        let context = FieldContext::new(&sets);
        let output = report.formatted_rows(&context).unwrap();
        assert_eq!(output.rows.len(), 1);
        assert_eq!(output.rows[0][0], "(520) 555-1212");
        assert!(output.has_errors());
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].row, 1);

        let strict = FieldContext::new(&sets).with_row_errors(RowErrorPolicy::FailFast);
        assert!(matches!(
            report.formatted_rows(&strict),
            Err(HubError::Internal { .. })
        ));
    }

    #[test]
    fn validate_reports_bad_and_blank_required_values() {
        let sets = value_sets();
        let context = FieldContext::new(&sets);
        let report = report(&[
            ["5205551212:1:", "Y", "20200705", ""],
            ["555-1212", "MAYBE", "", ""],
        ]);

        let errors = report.validate(&context).unwrap();
        let found: Vec<(usize, String)> = errors
            .iter()
            .map(|error| match &error.error {
                HubError::Validation(validation) => (error.row, validation.element.clone()),
                other => panic!("unexpected error {other}"),
            })
            .collect();
        assert_eq!(
            found,
            vec![
                (1, "patient_phone".to_string()),
                (1, "pregnant".to_string()),
                (1, "collected".to_string()),
            ]
        );
    }

    #[test]
    fn validate_aborts_on_metadata_defects() {
        let sets: Vec<ValueSet> = Vec::new();
        let context = FieldContext::new(&sets);
        let report = report(&[["", "Y", "20200705", ""]]);
        assert!(matches!(report.validate(&context), Err(HubError::Schema(_))));
    }
}
