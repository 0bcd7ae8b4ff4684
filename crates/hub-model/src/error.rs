use thiserror::Error;

/// Defects in the authored metadata itself.
///
/// These abort the whole load (or mapping build); they are never attributable
/// to a single row of data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing value set for element '{element}'")]
    MissingValueSet { element: String },

    #[error("invalid value set name '{value_set}' for element '{element}'")]
    UnknownValueSet { element: String, value_set: String },

    #[error("missing alt values for element '{element}'")]
    MissingAltValues { element: String },

    #[error("code element '{element}' has neither a value set nor alt values")]
    CodeWithoutValues { element: String },

    #[error("element '{element}' is not a code element")]
    NotCodeElement { element: String },

    #[error("unsupported format '{format}' for element '{element}'")]
    UnsupportedFormat { element: String, format: String },

    #[error("invalid date pattern '{pattern}' for element '{element}'")]
    InvalidPattern { element: String, pattern: String },

    #[error("basedOn/extends schema '{base}' does not exist for '{schema}'")]
    UnresolvedBase { schema: String, base: String },

    #[error("schema '{schema}' inherits from itself through '{base}'")]
    InheritanceCycle { schema: String, base: String },

    #[error("duplicate schema name '{schema}'")]
    DuplicateSchema { schema: String },

    #[error("schema '{schema}' has no elements")]
    EmptySchema { schema: String },

    #[error("duplicate element '{element}' in schema '{schema}'")]
    DuplicateElement { schema: String, element: String },

    #[error("mapper '{mapper}' is not found for element '{element}'")]
    UnknownMapper { element: String, mapper: String },

    #[error("invalid arguments for mapper '{mapper}' on element '{element}': {reason}")]
    InvalidMapperArgs {
        element: String,
        mapper: String,
        reason: String,
    },

    #[error("jurisdictional filter '{filter}' is not found")]
    UnknownFilter { filter: String },

    #[error("invalid arguments for filter '{filter}': {reason}")]
    InvalidFilterArgs { filter: String, reason: String },

    #[error("malformed expression '{expression}'")]
    MalformedExpression { expression: String },

    #[error("invalid regular expression '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("schema '{schema}' is not found")]
    UnknownSchema { schema: String },

    #[error("element '{element}' is not in schema '{schema}'")]
    UnknownElement { schema: String, element: String },

    #[error("lookup table '{table}' is not found")]
    UnknownLookupTable { table: String },

    #[error("improper batch value: {reason}")]
    ImproperBatch { reason: String },

    #[error("improper batch value for '{service}': {reason}")]
    InvalidBatch { service: String, reason: String },
}

/// A single data value that does not satisfy its element's type rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value '{value}' for element '{element}': {reason}")]
pub struct ValidationError {
    pub element: String,
    pub value: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(
        element: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            element: element.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Failures combining or projecting reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("cannot map schema '{from}' (topic '{from_topic}') to '{to}' (topic '{to_topic}')")]
    TopicMismatch {
        from: String,
        from_topic: String,
        to: String,
        to_topic: String,
    },

    #[error("schema '{found}' does not match the rest of the merge ('{expected}')")]
    SchemaMismatch { expected: String, found: String },

    #[error("cannot merge an empty report list")]
    EmptyMerge,

    #[error("row {row} has {found} values, schema '{schema}' expects {expected}")]
    RowShape {
        schema: String,
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error)]
pub enum HubError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("routing error: {0}")]
    Routing(#[from] RoutingError),

    #[error("error loading '{entry}': {source}")]
    Load {
        entry: String,
        #[source]
        source: Box<HubError>,
    },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl HubError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn load(entry: impl Into<String>, source: impl Into<HubError>) -> Self {
        Self::Load {
            entry: entry.into(),
            source: Box::new(source.into()),
        }
    }

    /// True when the failure is tied to one data value rather than the metadata.
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Load { source, .. } => source.is_validation(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, HubError>;

/// A failure attributed to one row of a report.
#[derive(Debug)]
pub struct RowError {
    /// Zero-based row index in the input.
    pub row: usize,
    pub error: HubError,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row, self.error)
    }
}
