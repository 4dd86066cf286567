//! TSA Result Mapping
//!
//! Projects raw store result sets onto typed records:
//!
//! - **Result**: serde model of the store's JSON response
//! - **Descriptor**: per-type column bindings ([`Measurement`], [`RecordDescriptor`])
//! - **Coerce**: narrowing of raw JSON values to field kinds
//! - **Cache**: process-wide compiled mappings keyed by record type
//! - **Mapper**: the decode itself ([`ResultMapper`])

mod cache;
mod coerce;
mod descriptor;
mod error;
mod mapper;
mod result;

pub use coerce::{FieldKind, FieldValue, Precision};
pub use descriptor::{ExtensionBag, Measurement, RecordDescriptor, StoreField};
pub use error::{MappingError, MappingResult};
pub use mapper::ResultMapper;
pub use result::{QueryResponse, Series, StatementResult};
