//! Mapping error types
//!
//! Defines all errors that can occur while projecting store results onto
//! typed records.

use thiserror::Error;

/// Errors that can occur while decoding a result set
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    /// Record declaration is incomplete or contradictory
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The store rejected the whole request
    #[error("Store returned an error: {0}")]
    StoreReported(String),

    /// The store rejected one of the statements
    #[error("Store returned an error with series: {0}")]
    SeriesReported(String),

    /// A bound field kind has no coercion rule
    #[error("Unsupported field type '{kind}' for column '{column}'")]
    UnsupportedFieldType { column: String, kind: String },

    /// Raw value does not have the shape the field kind expects
    #[error("Cannot coerce column '{column}' to {expected}: {value}")]
    TypeCoercion {
        column: String,
        expected: &'static str,
        value: String,
    },
}

/// Result type for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;
