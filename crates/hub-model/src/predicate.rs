//! Row predicates: per-column regular-expression tests combined with AND/OR.
//!
//! Both ad hoc report filters and named jurisdictional filters reduce to
//! these, so every row selection goes through one evaluator.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::SchemaError;

#[derive(Debug, Clone)]
pub enum RowPredicate {
    /// The column's value contains a match for the pattern.
    Matches { column: String, pattern: Regex },
    /// The column's value contains no match for the pattern.
    DoesNotMatch { column: String, pattern: Regex },
    All(Vec<RowPredicate>),
    Any(Vec<RowPredicate>),
}

pub fn compile_pattern(pattern: &str) -> Result<Regex, SchemaError> {
    Regex::new(pattern).map_err(|error| SchemaError::InvalidRegex {
        pattern: pattern.to_string(),
        reason: error.to_string(),
    })
}

/// Anchor alternatives so they must match the whole value.
pub fn whole_value_pattern<S: AsRef<str>>(alternatives: &[S]) -> String {
    let joined = alternatives
        .iter()
        .map(|alternative| format!("(?:{})", alternative.as_ref()))
        .collect::<Vec<_>>()
        .join("|");
    format!("^(?:{joined})$")
}

impl RowPredicate {
    pub fn matches(column: impl Into<String>, pattern: &str) -> Result<Self, SchemaError> {
        Ok(RowPredicate::Matches {
            column: column.into(),
            pattern: compile_pattern(pattern)?,
        })
    }

    pub fn does_not_match(column: impl Into<String>, pattern: &str) -> Result<Self, SchemaError> {
        Ok(RowPredicate::DoesNotMatch {
            column: column.into(),
            pattern: compile_pattern(pattern)?,
        })
    }

    /// Every column the predicate reads.
    pub fn columns(&self) -> BTreeSet<&str> {
        let mut columns = BTreeSet::new();
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns<'a>(&'a self, columns: &mut BTreeSet<&'a str>) {
        match self {
            RowPredicate::Matches { column, .. } | RowPredicate::DoesNotMatch { column, .. } => {
                columns.insert(column.as_str());
            }
            RowPredicate::All(predicates) | RowPredicate::Any(predicates) => {
                for predicate in predicates {
                    predicate.collect_columns(columns);
                }
            }
        }
    }

    /// Evaluate against one row. Absent columns read as empty.
    pub fn evaluate<'v, F>(&self, value_of: &F) -> bool
    where
        F: Fn(&str) -> Option<&'v str>,
    {
        match self {
            RowPredicate::Matches { column, pattern } => {
                pattern.is_match(value_of(column).unwrap_or(""))
            }
            RowPredicate::DoesNotMatch { column, pattern } => {
                !pattern.is_match(value_of(column).unwrap_or(""))
            }
            RowPredicate::All(predicates) => predicates
                .iter()
                .all(|predicate| predicate.evaluate(value_of)),
            RowPredicate::Any(predicates) => predicates
                .iter()
                .any(|predicate| predicate.evaluate(value_of)),
        }
    }
}
