use thiserror::Error;

/// Errors raised while loading or resolving a schema definition.
///
/// All of these are fatal to the run that triggered them: an invalid schema
/// cannot be used to judge any record, so nothing is partially resolved.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),
    #[error("cyclic inheritance involving '{0}'")]
    CyclicInheritance(String),
    #[error("'{class}' inherits from undefined type '{parent}'")]
    UnknownParent { class: String, parent: String },
    #[error("{class}.{field}: unknown range '{range}'")]
    UnknownRange {
        class: String,
        field: String,
        range: String,
    },
    #[error("'{class}' has no identifier field")]
    MissingIdentifier { class: String },
    #[error("'{class}' has multiple identifier fields ('{first}', '{second}')")]
    MultipleIdentifiers {
        class: String,
        first: String,
        second: String,
    },
    #[error("{class}.{field}: identifier fields must have range 'string'")]
    InvalidIdentifier { class: String, field: String },
    #[error(
        "{class}.{field}: conflicting definitions inherited from '{left}' and '{right}' \
         and not redefined by '{class}'"
    )]
    AmbiguousFieldOverride {
        class: String,
        field: String,
        left: String,
        right: String,
    },
    #[error("'{class}' overrides unknown field '{field}'")]
    UnknownOverrideTarget { class: String, field: String },
    #[error("{class}.{field}: invalid pattern")]
    InvalidPattern {
        class: String,
        field: String,
        #[source]
        source: regex::Error,
    },
    #[error("failed to parse schema definition: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
