//! Sensor readings as stored in the `sensorData` measurement
//!
//! Only the timestamp is modelled explicitly. Field values, aggregate columns
//! (`mean`, `max`, ...) and group tags all land in `extra_fields` and are
//! written back flattened, so a reading serialises as one flat JSON object.

use crate::mapping::{Measurement, RecordDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One row of sensor data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra_fields: HashMap<String, Value>,
}

impl SensorData {
    /// Value of an unmodelled column or tag
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.extra_fields.get(column)
    }
}

fn extra_fields(data: &mut SensorData) -> &mut HashMap<String, Value> {
    &mut data.extra_fields
}

impl Measurement for SensorData {
    const MEASUREMENT: &'static str = "sensorData";

    fn descriptor() -> RecordDescriptor<Self> {
        RecordDescriptor::new()
            .time("time", |data: &mut SensorData, time| data.time = Some(time))
            .extension(extra_fields)
    }
}
