//! Relative-time bounds
//!
//! A time bound is either an absolute instant, encoded as a quoted timestamp
//! literal, or an expression the store evaluates against its own clock such as
//! `now()-5m`. Detection is a plain substring test on the `now()` marker; the
//! rest of the expression is passed through untouched.

use chrono::{DateTime, Utc};
use std::fmt;

/// The `now()` marker and helpers for building relative expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeTime;

impl RelativeTime {
    /// Marker token recognised by the store
    pub const MARKER: &'static str = "now()";

    /// Does this bound refer to the store's clock?
    pub fn is_relative(bound: &str) -> bool {
        bound.contains(Self::MARKER)
    }

    /// `now()-<offset>`, e.g. `RelativeTime::ago("5m")` is `now()-5m`
    pub fn ago(offset: &str) -> String {
        format!("{}-{}", Self::MARKER, offset)
    }
}

/// A classified, non-empty time bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeBound {
    /// Store-evaluated expression, emitted verbatim
    Relative(String),
    /// Caller-supplied timestamp, emitted as a quoted literal
    Absolute(String),
}

impl TimeBound {
    /// Classify a raw bound; empty strings mean "unbounded"
    pub fn classify(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else if RelativeTime::is_relative(raw) {
            Some(Self::Relative(raw.to_string()))
        } else {
            Some(Self::Absolute(raw.to_string()))
        }
    }

    /// Absolute bound for an instant, rendered in UTC
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self::Absolute(crate::query::navigation::to_zulu(instant))
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Self::Relative(_))
    }
}

impl fmt::Display for TimeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relative(expr) => f.write_str(expr),
            Self::Absolute(ts) => f.write_str(&crate::query::statement::quote_literal(ts)),
        }
    }
}
