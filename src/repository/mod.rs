//! Data access
//!
//! The repository binds query criteria to the configured store, hands the
//! rendered statement to a [`QueryExecutor`] and decodes the response into
//! [`SensorData`](crate::model::SensorData) records.
//!
//! The executor is the only I/O seam. Transport, pooling and retries belong
//! to its implementation; the repository never retries.

mod sensor_data;

pub use sensor_data::SensorDataRepository;

use crate::mapping::{MappingError, QueryResponse};
use crate::query::{BoundQuery, QueryError};
use async_trait::async_trait;

/// Runs a bound statement against the store
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute one statement and return the raw response
    async fn execute(&self, query: &BoundQuery) -> RepositoryResult<QueryResponse>;
}

/// Errors that can occur while serving a data request
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Executor error: {0}")]
    Executor(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;
