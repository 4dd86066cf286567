//! Query error types
//!
//! Defines the conditions under which query criteria cannot be turned into a
//! store query.

use thiserror::Error;

/// Errors that can occur while building query criteria
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Every query must be scoped to a tenant
    #[error("Missing tenant: tenant id must not be empty")]
    MissingTenant,

    /// Criteria were rendered without a measurement to select from
    #[error("Missing table: no measurement to select from")]
    MissingTable,

    /// A time bucket of zero width was requested
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// Unit token that is not part of the resolution ladder
    #[error("Unknown resolution: {0}")]
    UnknownResolution(String),

    /// Shortcut name that is not one of the fixed presets
    #[error("Unknown shortcut: {0}")]
    UnknownShortcut(String),

    /// Drill-down window does not fit the time range supported by the store
    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
