//! Helpers over the string-only DataFrame that backs a report.

use hub_model::{HubError, Result};
use polars::prelude::{Column, DataFrame, NamedFrom, PolarsError, Series, StringChunked};

pub(crate) fn frame_error(error: PolarsError) -> HubError {
    HubError::internal(format!("report frame: {error}"))
}

pub(crate) fn string_column(name: &str, values: Vec<String>) -> Column {
    Series::new(name.into(), values).into()
}

/// A column with the same value on every row.
pub(crate) fn constant_column(name: &str, value: &str, height: usize) -> Column {
    string_column(name, vec![value.to_string(); height])
}

pub(crate) fn build_frame(columns: Vec<Column>) -> Result<DataFrame> {
    DataFrame::new(columns).map_err(frame_error)
}

/// Transpose row-major values into one column per name.
///
/// Every row must already have `names.len()` values.
pub(crate) fn frame_from_rows(names: &[&str], rows: Vec<Vec<String>>) -> Result<DataFrame> {
    let mut columns: Vec<Vec<String>> = names
        .iter()
        .map(|_| Vec::with_capacity(rows.len()))
        .collect();
    for row in rows {
        for (column, value) in columns.iter_mut().zip(row) {
            column.push(value);
        }
    }
    build_frame(
        names
            .iter()
            .zip(columns)
            .map(|(name, values)| string_column(name, values))
            .collect(),
    )
}

pub(crate) fn str_values<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    frame
        .column(name)
        .and_then(Column::str)
        .map_err(frame_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transposes_rows() {
        let frame = frame_from_rows(
            &["a", "b"],
            vec![
                vec!["1".to_string(), "2".to_string()],
                vec!["3".to_string(), "4".to_string()],
            ],
        )
        .unwrap();
        assert_eq!(frame.height(), 2);
        let b = str_values(&frame, "b").unwrap();
        assert_eq!(b.get(1), Some("4"));
        assert!(str_values(&frame, "c").is_err());
    }

    #[test]
    fn constant_fills_every_row() {
        let column = constant_column("x", "Y", 3);
        let frame = build_frame(vec![column]).unwrap();
        let values: Vec<_> = str_values(&frame, "x").unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("Y"); 3]);
    }
}
