//! Result projection
//!
//! Walks a [`QueryResponse`] and builds one record per row of every series
//! named after the record's measurement. Columns are matched first against
//! explicit bindings, then fall into the extension bag, and are otherwise
//! dropped. Group tags are applied to every row of their series the same way.
//!
//! Decoding is all-or-nothing: a store-reported error or a single value that
//! cannot be coerced fails the whole call.

use crate::mapping::cache;
use crate::mapping::coerce::{coerce, Precision};
use crate::mapping::descriptor::{Measurement, RecordMapping};
use crate::mapping::error::{MappingError, MappingResult};
use crate::mapping::result::{QueryResponse, Series};
use serde_json::Value;

/// Decodes result sets into typed records
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultMapper {
    precision: Precision,
}

impl ResultMapper {
    /// Mapper for RFC 3339 or millisecond epoch timestamps
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper for epoch timestamps of the given precision
    pub fn with_precision(precision: Precision) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Decode every row of `T`'s measurement
    pub fn to_records<T: Measurement>(&self, response: &QueryResponse) -> MappingResult<Vec<T>> {
        self.to_records_from(response, T::MEASUREMENT)
    }

    /// Decode every row of the series called `measurement` into `T`
    pub fn to_records_from<T: Measurement>(
        &self,
        response: &QueryResponse,
        measurement: &str,
    ) -> MappingResult<Vec<T>> {
        response.check()?;
        let mapping = cache::mapping_for::<T>()?;

        let mut records = Vec::new();
        for series in response.series() {
            if series.name != measurement {
                tracing::debug!(
                    series = %series.name,
                    expected = measurement,
                    "Skipping series"
                );
                continue;
            }
            self.decode_series(&mapping, series, &mut records)?;
        }

        tracing::debug!(
            measurement,
            records = records.len(),
            "Decoded result set"
        );

        Ok(records)
    }

    fn decode_series<T: Measurement>(
        &self,
        mapping: &RecordMapping<T>,
        series: &Series,
        records: &mut Vec<T>,
    ) -> MappingResult<()> {
        let tags: Vec<(&String, Value)> = series
            .tags
            .iter()
            .flatten()
            .map(|(key, value)| (key, Value::String(value.clone())))
            .collect();

        for row in &series.values {
            let mut record = T::default();
            let mut matched = false;

            for (column, value) in series.columns.iter().zip(row) {
                matched |= self.apply(mapping, &mut record, column, value)?;
            }
            for (key, value) in &tags {
                matched |= self.apply(mapping, &mut record, key, value)?;
            }

            if matched {
                records.push(record);
            }
        }

        Ok(())
    }

    /// Route one value to its binding or to the extension bag.
    /// Returns whether the column was claimed.
    fn apply<T>(
        &self,
        mapping: &RecordMapping<T>,
        record: &mut T,
        column: &str,
        value: &Value,
    ) -> MappingResult<bool> {
        if let Some(binding) = mapping.binding(column) {
            if let Some(coerced) = coerce(column, binding.kind, value, self.precision)? {
                if !(binding.assign)(record, coerced) {
                    return Err(MappingError::TypeCoercion {
                        column: column.to_string(),
                        expected: binding.kind.name(),
                        value: value.to_string(),
                    });
                }
            }
            return Ok(true);
        }

        if let Some(bag) = mapping.extension() {
            bag(record).insert(column.to_string(), value.clone());
            return Ok(true);
        }

        Ok(false)
    }
}
