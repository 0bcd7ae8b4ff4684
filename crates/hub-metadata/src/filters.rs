//! Jurisdictional filters: named row selections used by services.
//!
//! A service lists filter call expressions such as
//! `matches(ordering_facility_state, AZ)`; a row goes to the service only if
//! every filter selects it.

use hub_model::predicate::whole_value_pattern;
use hub_model::{RowPredicate, SchemaError};

pub const PATIENT_STATE: &str = "patient_state";
pub const PATIENT_COUNTY: &str = "patient_county";
pub const ORDERING_FACILITY_STATE: &str = "ordering_facility_state";
pub const ORDERING_FACILITY_COUNTY: &str = "ordering_facility_county";

pub trait JurisdictionalFilter: Send + Sync {
    fn name(&self) -> &str;

    /// Build the row predicate for one call of this filter.
    fn predicate(&self, args: &[String]) -> Result<RowPredicate, SchemaError>;
}

fn invalid_args(filter: &dyn JurisdictionalFilter, reason: &str) -> SchemaError {
    SchemaError::InvalidFilterArgs {
        filter: filter.name().to_string(),
        reason: reason.to_string(),
    }
}

/// `matches(column, regex, ...)`: the whole value matches one of the patterns.
pub struct Matches;

impl JurisdictionalFilter for Matches {
    fn name(&self) -> &str {
        "matches"
    }

    fn predicate(&self, args: &[String]) -> Result<RowPredicate, SchemaError> {
        let [column, patterns @ ..] = args else {
            return Err(invalid_args(self, "expects a column and at least one pattern"));
        };
        if patterns.is_empty() {
            return Err(invalid_args(self, "expects a column and at least one pattern"));
        }
        RowPredicate::matches(column.as_str(), &whole_value_pattern(patterns))
    }
}

/// `doesNotMatch(column, regex, ...)`: the whole value matches none of the patterns.
pub struct DoesNotMatch;

impl JurisdictionalFilter for DoesNotMatch {
    fn name(&self) -> &str {
        "doesNotMatch"
    }

    fn predicate(&self, args: &[String]) -> Result<RowPredicate, SchemaError> {
        let [column, patterns @ ..] = args else {
            return Err(invalid_args(self, "expects a column and at least one pattern"));
        };
        if patterns.is_empty() {
            return Err(invalid_args(self, "expects a column and at least one pattern"));
        }
        RowPredicate::does_not_match(column.as_str(), &whole_value_pattern(patterns))
    }
}

/// `filterByCounty(state, county)`: the patient or the ordering facility is
/// in the county. Comparison ignores case.
pub struct FilterByCounty;

impl FilterByCounty {
    fn located_in(
        state_column: &str,
        county_column: &str,
        state: &str,
        county: &str,
    ) -> Result<RowPredicate, SchemaError> {
        Ok(RowPredicate::All(vec![
            RowPredicate::matches(state_column, &exact_ignoring_case(state))?,
            RowPredicate::matches(county_column, &exact_ignoring_case(county))?,
        ]))
    }
}

fn exact_ignoring_case(value: &str) -> String {
    format!("(?i)^{}$", regex::escape(value))
}

impl JurisdictionalFilter for FilterByCounty {
    fn name(&self) -> &str {
        "filterByCounty"
    }

    fn predicate(&self, args: &[String]) -> Result<RowPredicate, SchemaError> {
        let [state, county] = args else {
            return Err(invalid_args(self, "expects a state and a county"));
        };
        Ok(RowPredicate::Any(vec![
            Self::located_in(PATIENT_STATE, PATIENT_COUNTY, state, county)?,
            Self::located_in(ORDERING_FACILITY_STATE, ORDERING_FACILITY_COUNTY, state, county)?,
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    fn lookup<'a>(row: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<&'a str> {
        move |column| {
            row.iter()
                .find(|(name, _)| *name == column)
                .map(|(_, value)| *value)
        }
    }

    #[test]
    fn matches_whole_value_against_any_pattern() {
        let predicate = Matches.predicate(&args(&["a", "1", "3"])).unwrap();
        assert!(predicate.evaluate(&lookup(&[("a", "1")])));
        assert!(predicate.evaluate(&lookup(&[("a", "3")])));
        assert!(!predicate.evaluate(&lookup(&[("a", "13")])));
    }

    #[test]
    fn does_not_match() {
        let predicate = DoesNotMatch.predicate(&args(&["a", "1"])).unwrap();
        assert!(!predicate.evaluate(&lookup(&[("a", "1")])));
        assert!(predicate.evaluate(&lookup(&[("a", "2")])));
    }

    #[test]
    fn county_by_patient_or_facility() {
        let predicate = FilterByCounty.predicate(&args(&["AZ", "Pima"])).unwrap();
        let patient = [("patient_state", "az"), ("patient_county", "PIMA")];
        let facility = [
            ("patient_state", "NM"),
            ("ordering_facility_state", "AZ"),
            ("ordering_facility_county", "Pima"),
        ];
        let neither = [("patient_state", "AZ"), ("patient_county", "Maricopa")];
        assert!(predicate.evaluate(&lookup(&patient)));
        assert!(predicate.evaluate(&lookup(&facility)));
        assert!(!predicate.evaluate(&lookup(&neither)));
    }

    #[test]
    fn argument_counts() {
        assert!(matches!(
            Matches.predicate(&args(&["a"])),
            Err(SchemaError::InvalidFilterArgs { .. })
        ));
        assert!(FilterByCounty.predicate(&args(&["AZ"])).is_err());
        assert!(matches!(
            Matches.predicate(&args(&["a", "("])),
            Err(SchemaError::InvalidRegex { .. })
        ));
    }
}
