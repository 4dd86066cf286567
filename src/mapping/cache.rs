//! Process-wide cache of compiled record mappings
//!
//! Mappings are keyed by record type and live for the rest of the process.
//! Compilation runs outside the map's shard locks; when two threads race on
//! the same type, the first insert wins and the loser's copy is dropped, so
//! every caller observes one complete mapping.

use crate::mapping::descriptor::{Measurement, RecordMapping};
use crate::mapping::error::{MappingError, MappingResult};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::sync::Arc;

type Entry = Arc<dyn Any + Send + Sync>;

static MAPPINGS: Lazy<DashMap<TypeId, Entry>> = Lazy::new(DashMap::new);

/// Mapping for `T`, compiled on first use
pub(crate) fn mapping_for<T: Measurement>() -> MappingResult<Arc<RecordMapping<T>>> {
    let key = TypeId::of::<T>();

    // Clone out of the guard so no shard lock is held while downcasting
    let cached = MAPPINGS.get(&key).map(|entry| Arc::clone(entry.value()));
    if let Some(entry) = cached {
        return downcast(entry);
    }

    let mapping = RecordMapping::<T>::compile()?;
    tracing::debug!(
        record = std::any::type_name::<T>(),
        measurement = mapping.measurement(),
        columns = mapping.columns(),
        "Compiled record mapping"
    );

    let compiled: Entry = Arc::new(mapping);
    let winner = Arc::clone(MAPPINGS.entry(key).or_insert(compiled).value());

    downcast(winner)
}

fn downcast<T: Measurement>(entry: Entry) -> MappingResult<Arc<RecordMapping<T>>> {
    entry.downcast::<RecordMapping<T>>().map_err(|_| {
        MappingError::Configuration(format!(
            "cached mapping for {} has the wrong type",
            std::any::type_name::<T>()
        ))
    })
}
