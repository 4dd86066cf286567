//! # TSA
//!
//! Tenant-scoped time-series access: builds InfluxQL queries from structured
//! requests and decodes the store's result sets into typed records.
//!
//! ## Features
//!
//! - **Tenant isolation**: every statement carries a `tenantId` predicate
//! - **Relative windows**: `now()`-based bounds pass through as store functions
//! - **Rollup navigation**: shortcut presets and drill-down across the
//!   Days → Hours → Minutes → Seconds ladder
//! - **Typed decoding**: declared column bindings with an extension bag for
//!   everything else, compiled once per record type
//!
//! ## Modules
//!
//! - [`query`]: Query criteria, rendering and navigation
//! - [`mapping`]: Result set projection onto records
//! - [`model`]: The `sensorData` record
//! - [`repository`]: Executor seam and sensor data access
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tsa::mapping::{QueryResponse, ResultMapper};
//! use tsa::query::{QueryCriteria, Resolution};
//! use tsa::SensorData;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let query = QueryCriteria::builder()
//!         .database("iot")
//!         .table("sensorData")
//!         .tenant_id("t1")
//!         .id("s1")
//!         .from("now()-5m")
//!         .select("mean(*)")
//!         .interval(30, Resolution::Seconds)
//!         .build()?
//!         .to_query()?;
//!
//!     println!("{}", query);
//!
//!     let body = r#"{"results":[{"statement_id":0}]}"#;
//!     let response = QueryResponse::from_json(body)?;
//!     let data: Vec<SensorData> = ResultMapper::new().to_records(&response)?;
//!     println!("Decoded {} readings", data.len());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod mapping;
pub mod model;
pub mod query;
pub mod repository;

// Re-export top-level types for convenience
pub use query::{
    BoundQuery, DrillDown, QueryCriteria, QueryCriteriaBuilder, QueryError, QueryResult,
    Resolution, Shortcut,
};

pub use mapping::{
    Measurement, MappingError, MappingResult, Precision, QueryResponse, RecordDescriptor,
    ResultMapper, Series,
};

pub use model::SensorData;

pub use repository::{QueryExecutor, RepositoryError, RepositoryResult, SensorDataRepository};

pub use config::{Config, ConfigError, LoggingConfig, StoreConfig};
