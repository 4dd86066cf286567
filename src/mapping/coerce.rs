//! Value coercion
//!
//! The store's JSON encoding carries every number as a double and every
//! timestamp either as an RFC 3339 string or as an epoch number, depending on
//! the precision the query was issued with. This module narrows those raw
//! values to the kinds a record field can declare.

use crate::mapping::error::{MappingError, MappingResult};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a bound record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Instant,
    Double,
    Long,
    Int,
    Bool,
    /// A kind the mapper has no rule for; assigning to it is an error
    Other(&'static str),
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Instant => "instant",
            Self::Double => "f64",
            Self::Long => "i64",
            Self::Int => "i32",
            Self::Bool => "bool",
            Self::Other(name) => name,
        }
    }
}

/// A raw value after coercion
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Instant(DateTime<Utc>),
    Double(f64),
    Long(i64),
    Int(i32),
    Bool(bool),
}

/// Unit of epoch timestamps in a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[serde(alias = "ns")]
    Nanoseconds,
    #[serde(alias = "u", alias = "us")]
    Microseconds,
    #[default]
    #[serde(alias = "ms")]
    Milliseconds,
    #[serde(alias = "s")]
    Seconds,
}

impl Precision {
    /// Store token for the `epoch` request parameter
    pub fn token(self) -> &'static str {
        match self {
            Self::Nanoseconds => "ns",
            Self::Microseconds => "u",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
        }
    }

    fn per_second(self) -> i64 {
        match self {
            Self::Nanoseconds => 1_000_000_000,
            Self::Microseconds => 1_000_000,
            Self::Milliseconds => 1_000,
            Self::Seconds => 1,
        }
    }

    /// Convert an epoch count in this precision to an instant
    pub fn to_instant(self, epoch: i64) -> Option<DateTime<Utc>> {
        let per_second = self.per_second();
        let secs = epoch.div_euclid(per_second);
        let nanos = epoch.rem_euclid(per_second) * (1_000_000_000 / per_second);
        Utc.timestamp_opt(secs, nanos as u32).single()
    }
}

impl std::str::FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ns" | "nanoseconds" => Ok(Self::Nanoseconds),
            "u" | "us" | "microseconds" => Ok(Self::Microseconds),
            "ms" | "milliseconds" => Ok(Self::Milliseconds),
            "s" | "seconds" => Ok(Self::Seconds),
            _ => Err(format!("Unknown precision: {}", s)),
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Text form of a raw value; strings are taken without their JSON quotes
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce `value` to `kind`. `Ok(None)` means the value was null and the field
/// keeps its default.
pub(crate) fn coerce(
    column: &str,
    kind: FieldKind,
    value: &Value,
    precision: Precision,
) -> MappingResult<Option<FieldValue>> {
    if value.is_null() {
        return Ok(None);
    }

    let mismatch = || MappingError::TypeCoercion {
        column: column.to_string(),
        expected: kind.name(),
        value: value.to_string(),
    };

    let coerced = match kind {
        FieldKind::Text => FieldValue::Text(stringify(value)),
        FieldKind::Bool => FieldValue::Bool(stringify(value).eq_ignore_ascii_case("true")),
        FieldKind::Instant => match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|t| FieldValue::Instant(t.with_timezone(&Utc)))
                .map_err(|_| mismatch())?,
            Value::Number(n) => {
                let epoch = n
                    .as_i64()
                    .or_else(|| n.as_f64().map(|f| f as i64))
                    .ok_or_else(mismatch)?;
                FieldValue::Instant(precision.to_instant(epoch).ok_or_else(mismatch)?)
            }
            _ => return Err(mismatch()),
        },
        FieldKind::Double => FieldValue::Double(wide_number(value).ok_or_else(mismatch)?),
        FieldKind::Long => FieldValue::Long(integer(value).ok_or_else(mismatch)?),
        FieldKind::Int => {
            let n = integer(value).ok_or_else(mismatch)?;
            FieldValue::Int(i32::try_from(n).map_err(|_| mismatch())?)
        }
        FieldKind::Other(name) => {
            return Err(MappingError::UnsupportedFieldType {
                column: column.to_string(),
                kind: name.to_string(),
            })
        }
    };

    Ok(Some(coerced))
}

/// Numbers arrive as doubles; tag values arrive as strings
fn wide_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
