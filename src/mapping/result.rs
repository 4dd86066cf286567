//! Raw result sets as returned by the store's HTTP query endpoint
//!
//! ```json
//! {"results":[{"statement_id":0,"series":[{"name":"sensorData",
//!   "tags":{"id":"s1"},"columns":["time","temperature"],
//!   "values":[["2024-01-01T00:00:00Z",21.5]]}]}]}
//! ```

use crate::mapping::error::{MappingError, MappingResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Top-level response: one result per statement, plus a request-level error
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<StatementResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    /// Parse a response body
    pub fn from_json(body: &str) -> MappingResult<Self> {
        serde_json::from_str(body)
            .map_err(|e| MappingError::StoreReported(format!("malformed response: {}", e)))
    }

    /// Response holding a single statement's series
    pub fn with_series(series: Vec<Series>) -> Self {
        Self {
            results: vec![StatementResult {
                statement_id: 0,
                series: Some(series),
                error: None,
            }],
            error: None,
        }
    }

    /// First error reported anywhere in the response, request level first
    pub(crate) fn check(&self) -> MappingResult<()> {
        if let Some(error) = &self.error {
            return Err(MappingError::StoreReported(error.clone()));
        }
        match self.results.iter().find_map(|r| r.error.as_ref()) {
            Some(error) => Err(MappingError::SeriesReported(error.clone())),
            None => Ok(()),
        }
    }

    /// Every series of every statement, in response order
    pub fn series(&self) -> impl Iterator<Item = &Series> {
        self.results
            .iter()
            .filter_map(|r| r.series.as_deref())
            .flatten()
    }
}

/// Result of one statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub statement_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<Vec<Series>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A named table of rows; grouped queries carry the group's tag values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder method: set the column names
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method: append a row
    pub fn row(mut self, row: Vec<Value>) -> Self {
        self.values.push(row);
        self
    }

    /// Builder method: add a group tag
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}
