//! Mappers derive a target element's value from source elements.
//!
//! An element references a mapper with a call expression such as
//! `concat(patient_first_name, patient_last_name)`. The mapper names the
//! source elements it reads; per row it only sees those with a non-blank
//! value, in argument order.

use hub_model::{Element, Schema};

use crate::catalog::MetadataCatalog;

/// What a mapper can consult besides the row values.
#[derive(Clone, Copy)]
pub struct MapperContext<'a> {
    /// The target element being filled.
    pub element: &'a Element,
    /// The schema the row values come from.
    pub source: &'a Schema,
    pub catalog: &'a MetadataCatalog,
}

/// One non-blank source value handed to a mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperInput<'a> {
    pub element: &'a str,
    pub value: &'a str,
}

fn input_value<'a>(inputs: &[MapperInput<'a>], element: &str) -> Option<&'a str> {
    inputs
        .iter()
        .find(|input| input.element == element)
        .map(|input| input.value)
}

pub trait Mapper: Send + Sync {
    fn name(&self) -> &str;

    /// Check the arguments and return the source elements the mapper reads.
    ///
    /// The error is a human-readable reason.
    fn element_names(&self, element: &Element, args: &[String]) -> Result<Vec<String>, String>;

    /// Compute the value, or `None` to fall back to the element default.
    fn apply(
        &self,
        context: &MapperContext<'_>,
        args: &[String],
        inputs: &[MapperInput<'_>],
    ) -> Option<String>;
}

/// First letter of a name, upper-cased.
pub struct MiddleInitialMapper;

impl Mapper for MiddleInitialMapper {
    fn name(&self) -> &str {
        "middleInitial"
    }

    fn element_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, String> {
        match args {
            [name] => Ok(vec![name.clone()]),
            _ => Err("expects exactly one element".to_string()),
        }
    }

    fn apply(
        &self,
        _context: &MapperContext<'_>,
        args: &[String],
        inputs: &[MapperInput<'_>],
    ) -> Option<String> {
        let value = input_value(inputs, args.first()?)?;
        value
            .trim()
            .chars()
            .next()
            .map(|initial| initial.to_uppercase().collect())
    }
}

/// The first of the named elements that has a value.
pub struct UseMapper;

impl Mapper for UseMapper {
    fn name(&self) -> &str {
        "use"
    }

    fn element_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, String> {
        if args.is_empty() {
            return Err("expects at least one element".to_string());
        }
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        _context: &MapperContext<'_>,
        args: &[String],
        inputs: &[MapperInput<'_>],
    ) -> Option<String> {
        args.iter()
            .find_map(|name| input_value(inputs, name))
            .map(str::to_string)
    }
}

/// A fixed value whenever the named element has one.
pub struct IfPresentMapper;

impl Mapper for IfPresentMapper {
    fn name(&self) -> &str {
        "ifPresent"
    }

    fn element_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, String> {
        match args {
            [name, _value] => Ok(vec![name.clone()]),
            _ => Err("expects an element and a value".to_string()),
        }
    }

    fn apply(
        &self,
        _context: &MapperContext<'_>,
        args: &[String],
        inputs: &[MapperInput<'_>],
    ) -> Option<String> {
        let [name, value] = args else {
            return None;
        };
        input_value(inputs, name).map(|_| value.clone())
    }
}

/// Look a value up in the target element's table.
///
/// `lookup(indexElement)` matches the index element's value against the
/// index element's own `tableColumn` (or a column named like the element);
/// `lookup(indexElement, indexColumn)` names the column explicitly. The
/// result is the target element's `tableColumn`.
pub struct LookupMapper;

impl Mapper for LookupMapper {
    fn name(&self) -> &str {
        "lookup"
    }

    fn element_names(&self, element: &Element, args: &[String]) -> Result<Vec<String>, String> {
        if element.table.is_none() || element.table_column.is_none() {
            return Err(format!("element '{}' needs a table and tableColumn", element.name));
        }
        match args {
            [index] | [index, _] => Ok(vec![index.clone()]),
            _ => Err("expects an index element and an optional index column".to_string()),
        }
    }

    fn apply(
        &self,
        context: &MapperContext<'_>,
        args: &[String],
        inputs: &[MapperInput<'_>],
    ) -> Option<String> {
        let index_element = args.first()?;
        let index_value = input_value(inputs, index_element)?;
        let index_column = match args.get(1) {
            Some(column) => column.as_str(),
            None => context
                .source
                .find_element(index_element)
                .and_then(|element| element.table_column.as_deref())
                .unwrap_or(index_element),
        };
        let table = context
            .catalog
            .find_lookup_table(context.element.table.as_deref()?)?;
        table
            .lookup_value(
                index_column,
                index_value,
                context.element.table_column.as_deref()?,
            )
            .map(str::to_string)
    }
}

/// Join the values that are present with `", "`.
pub struct ConcatenateMapper;

pub const CONCAT_SEPARATOR: &str = ", ";

impl Mapper for ConcatenateMapper {
    fn name(&self) -> &str {
        "concat"
    }

    fn element_names(&self, _element: &Element, args: &[String]) -> Result<Vec<String>, String> {
        if args.is_empty() {
            return Err("expects at least one element".to_string());
        }
        Ok(args.to_vec())
    }

    fn apply(
        &self,
        _context: &MapperContext<'_>,
        args: &[String],
        inputs: &[MapperInput<'_>],
    ) -> Option<String> {
        let values: Vec<&str> = args
            .iter()
            .filter_map(|name| input_value(inputs, name))
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(CONCAT_SEPARATOR))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogBuilder;
    use hub_model::LookupTable;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    fn run(mapper: &dyn Mapper, element: &Element, call: &[&str], inputs: &[MapperInput<'_>]) -> Option<String> {
        let catalog = CatalogBuilder::new()
            .with_lookup_table(
                "fips",
                LookupTable::new(
                    vec!["state".into(), "county".into(), "fips".into()],
                    vec![vec!["AZ".into(), "Pima".into(), "04019".into()]],
                ),
            )
            .build()
            .unwrap();
        let source = Schema::new("source", "t", vec![Element::new("patient_county")]);
        let context = MapperContext {
            element,
            source: &source,
            catalog: &catalog,
        };
        mapper.apply(&context, &args(call), inputs)
    }

    fn input<'a>(element: &'a str, value: &'a str) -> MapperInput<'a> {
        MapperInput { element, value }
    }

    #[test]
    fn middle_initial() {
        let target = Element::new("patient_middle_initial");
        let result = run(&MiddleInitialMapper, &target, &["m"], &[input("m", "quincy")]);
        assert_eq!(result.as_deref(), Some("Q"));
        assert_eq!(run(&MiddleInitialMapper, &target, &["m"], &[]), None);
    }

    #[test]
    fn use_takes_first_present() {
        let target = Element::new("x");
        let inputs = [input("b", "2"), input("c", "3")];
        assert_eq!(run(&UseMapper, &target, &["a", "c", "b"], &inputs).as_deref(), Some("3"));
        assert_eq!(run(&UseMapper, &target, &["a"], &inputs), None);
    }

    #[test]
    fn if_present() {
        let target = Element::new("x");
        let inputs = [input("a", "anything")];
        assert_eq!(run(&IfPresentMapper, &target, &["a", "Y"], &inputs).as_deref(), Some("Y"));
        assert_eq!(run(&IfPresentMapper, &target, &["b", "Y"], &inputs), None);
    }

    #[test]
    fn concat_skips_missing() {
        let target = Element::new("x");
        let inputs = [input("last", "Doe"), input("first", "Jane")];
        assert_eq!(
            run(&ConcatenateMapper, &target, &["first", "middle", "last"], &inputs).as_deref(),
            Some("Jane, Doe")
        );
    }

    #[test]
    fn lookup_reads_target_table() {
        let target = Element::new("patient_county_code").with_table("fips", "fips");
        let inputs = [input("patient_county", "PIMA")];
        assert_eq!(
            run(&LookupMapper, &target, &["patient_county", "county"], &inputs).as_deref(),
            Some("04019")
        );
        // Without an explicit column the element name is tried as the column.
        assert_eq!(run(&LookupMapper, &target, &["patient_county"], &inputs), None);
    }

    #[test]
    fn argument_checks() {
        let plain = Element::new("x");
        assert!(MiddleInitialMapper.element_names(&plain, &args(&["a", "b"])).is_err());
        assert!(IfPresentMapper.element_names(&plain, &args(&["a"])).is_err());
        assert!(LookupMapper.element_names(&plain, &args(&["a"])).is_err());
        let table = Element::new("x").with_table("fips", "fips");
        assert_eq!(LookupMapper.element_names(&table, &args(&["a", "c"])).unwrap(), vec!["a"]);
    }
}
