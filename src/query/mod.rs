//! TSA Query Builder
//!
//! Turns structured, partially specified requests into InfluxQL:
//!
//! - **Resolution**: the fixed Seconds → Days ladder and its bucket defaults
//! - **Relative**: `now()`-relative bounds versus absolute timestamps
//! - **Criteria**: immutable request description and its builder
//! - **Statement**: rendering criteria into a database-bound query
//! - **Navigation**: drill-down steps and shortcut presets
//!
//! # Query Shape
//!
//! ```text
//! SELECT <expr>,... | *
//! FROM <measurement>
//! WHERE tenantId = '<tenant>' [AND id = '<id>']
//!       [AND time >= <from>] [AND time <= <to>]
//! [GROUP BY <tags> | GROUP BY time(<n><unit>)]
//! ```
//!
//! # Examples
//!
//! ## Bucketed query
//!
//! ```rust,ignore
//! use tsa::query::{QueryCriteria, Resolution};
//!
//! let query = QueryCriteria::builder()
//!     .database("iot")
//!     .table("sensorData")
//!     .tenant_id("t1")
//!     .from("now()-1h")
//!     .select("mean(*)")
//!     .interval(5, Resolution::Minutes)
//!     .build()?
//!     .to_query()?;
//! ```
//!
//! ## Shortcut preset
//!
//! ```rust,ignore
//! use tsa::query::Shortcut;
//!
//! let criteria = Shortcut::LastDayGroupBy
//!     .criteria("t1", Some("s1"))
//!     .table("sensorData")
//!     .build()?;
//! ```

mod criteria;
mod error;
mod navigation;
mod relative;
mod resolution;
mod statement;

pub use criteria::{Grouping, QueryCriteria, QueryCriteriaBuilder};
pub use error::{QueryError, QueryResult};
pub use navigation::{to_zulu, DrillDown, Shortcut, DEFAULT_AGGREGATE_SELECT_CRITERIA};
pub use relative::{RelativeTime, TimeBound};
pub use resolution::{Resolution, ResolutionLevel};
pub use statement::{render, render_or, BoundQuery};
