//! Call expressions: `name(arg, arg, ...)`.
//!
//! Mappers and jurisdictional filters are referenced from metadata with
//! this syntax. Arguments are split on commas and trimmed; the argument list
//! runs from the first `(` to the last `)`, so regular expression arguments
//! may contain parentheses but not commas.

use hub_model::SchemaError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpression {
    pub name: String,
    pub args: Vec<String>,
}

pub fn parse_call(expression: &str) -> Result<CallExpression, SchemaError> {
    let malformed = || SchemaError::MalformedExpression {
        expression: expression.to_string(),
    };
    let trimmed = expression.trim();
    let open = trimmed.find('(').ok_or_else(malformed)?;
    let inner = trimmed[open + 1..].strip_suffix(')').ok_or_else(malformed)?;
    let name = trimmed[..open].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(malformed());
    }
    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        inner.split(',').map(|arg| arg.trim().to_string()).collect()
    };
    if args.iter().any(String::is_empty) {
        return Err(malformed());
    }
    Ok(CallExpression {
        name: name.to_string(),
        args,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_trimmed_args() {
        let call = parse_call("concat( patient_first_name ,patient_last_name)").unwrap();
        assert_eq!(call.name, "concat");
        assert_eq!(call.args, vec!["patient_first_name", "patient_last_name"]);
    }

    #[test]
    fn empty_argument_list() {
        assert!(parse_call("now()").unwrap().args.is_empty());
    }

    #[test]
    fn regex_arguments_keep_parentheses() {
        let call = parse_call("matches(ordering_facility_state, (?i)^(AZ|NM)$)").unwrap();
        assert_eq!(call.args[1], "(?i)^(AZ|NM)$");
    }

    #[test]
    fn malformed() {
        for bad in ["concat", "concat(a", "(a)", "bad name(a)", "use(a,,b)"] {
            assert!(
                matches!(parse_call(bad), Err(SchemaError::MalformedExpression { .. })),
                "{bad}"
            );
        }
    }
}
