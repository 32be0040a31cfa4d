//! Error types for simdigi-core.

use thiserror::Error;

/// Result type alias for simdigi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for simdigi operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// None of the accepted names of a logical field is present.
    #[error("schema mismatch: field `{field}` not found (accepted names: {})", .aliases.join(", "))]
    SchemaMismatch {
        field: String,
        aliases: Vec<String>,
    },

    /// A per-hit or per-particle column disagrees in length with its siblings.
    #[error("column `{field}` has {found} entries, expected {expected}")]
    ColumnLength {
        field: String,
        expected: usize,
        found: usize,
    },

    /// A column holds a value that cannot be represented as the field's type.
    #[error("column `{field}` holds a non-integral value {value} at index {index}")]
    NonIntegral {
        field: String,
        index: usize,
        value: f64,
    },

    /// An integral value does not fit the field's integer width.
    #[error("column `{field}` value {value} at index {index} is out of range")]
    OutOfRange {
        field: String,
        index: usize,
        value: i64,
    },

    /// A scalar field was given as an array, or the reverse.
    #[error("field `{field}` has the wrong shape: {reason}")]
    FieldShape { field: String, reason: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Builds a [`Error::SchemaMismatch`] for a logical field and its aliases.
    pub fn schema_mismatch<S: AsRef<str>>(field: &str, aliases: &[S]) -> Self {
        Error::SchemaMismatch {
            field: field.to_string(),
            aliases: aliases.iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }
}
