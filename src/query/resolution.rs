//! Resolution Hierarchy
//!
//! The four fixed time granularities used for bucketed queries and for the
//! drill-down ladder:
//!
//! ```text
//! Days ──► Hours ──► Minutes ──► Seconds ──► (ungrouped)
//!  1d        1h         5m          30s
//! ```
//!
//! Each level carries the unit token accepted by the store's `time()` bucket
//! function, its next finer level, and the bucket count used when a caller
//! asks to "group by this level" without giving one.

use crate::query::error::QueryError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A time granularity, ordered finest to coarsest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "S", alias = "s", alias = "seconds")]
    Seconds,
    #[serde(rename = "M", alias = "m", alias = "minutes")]
    Minutes,
    #[serde(rename = "H", alias = "h", alias = "hours")]
    Hours,
    #[serde(rename = "D", alias = "d", alias = "days")]
    Days,
}

/// Static description of one level of the ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionLevel {
    /// Unit symbol for the store's `time(<n><unit>)` bucket function
    pub store_unit_token: &'static str,
    /// Adjacent finer level, `None` at the bottom of the ladder
    pub next_finer: Option<Resolution>,
    /// Bucket width used when grouping by this level without an explicit count
    pub default_bucket_count: u64,
    /// Length of one unit in seconds
    unit_seconds: i64,
}

/// The ladder, indexed by `Resolution as usize`. Never mutated.
const LEVELS: [ResolutionLevel; 4] = [
    ResolutionLevel {
        store_unit_token: "s",
        next_finer: None,
        default_bucket_count: 30,
        unit_seconds: 1,
    },
    ResolutionLevel {
        store_unit_token: "m",
        next_finer: Some(Resolution::Seconds),
        default_bucket_count: 5,
        unit_seconds: 60,
    },
    ResolutionLevel {
        store_unit_token: "h",
        next_finer: Some(Resolution::Minutes),
        default_bucket_count: 1,
        unit_seconds: 3_600,
    },
    ResolutionLevel {
        store_unit_token: "d",
        next_finer: Some(Resolution::Hours),
        default_bucket_count: 1,
        unit_seconds: 86_400,
    },
];

impl Resolution {
    /// All levels, finest first
    pub const ALL: [Resolution; 4] = [
        Resolution::Seconds,
        Resolution::Minutes,
        Resolution::Hours,
        Resolution::Days,
    ];

    /// The static level record for this resolution
    pub fn level(self) -> &'static ResolutionLevel {
        &LEVELS[self as usize]
    }

    /// Unit symbol understood by the store (`s`, `m`, `h`, `d`)
    pub fn store_unit_token(self) -> &'static str {
        self.level().store_unit_token
    }

    /// Next finer level, or `None` for [`Resolution::Seconds`]
    pub fn next_finer(self) -> Option<Resolution> {
        self.level().next_finer
    }

    /// Default bucket width for grouping at this level
    pub fn default_bucket_count(self) -> u64 {
        self.level().default_bucket_count
    }

    /// Duration of `count` units of this level.
    ///
    /// Returns `None` when the span does not fit in a [`chrono::Duration`].
    pub fn span(self, count: u64) -> Option<Duration> {
        let count = i64::try_from(count).ok()?;
        let seconds = count.checked_mul(self.level().unit_seconds)?;
        Duration::try_seconds(seconds)
    }

    /// Walk the ladder from this level down to the finest one, inclusive
    pub fn finer_chain(self) -> impl Iterator<Item = Resolution> {
        std::iter::successors(Some(self), |r| r.next_finer())
    }
}

impl FromStr for Resolution {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Ok(Self::Seconds),
            "m" | "min" | "minute" | "minutes" => Ok(Self::Minutes),
            "h" | "hour" | "hours" => Ok(Self::Hours),
            "d" | "day" | "days" => Ok(Self::Days),
            other => Err(QueryError::UnknownResolution(other.to_string())),
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seconds => write!(f, "S"),
            Self::Minutes => write!(f, "M"),
            Self::Hours => write!(f, "H"),
            Self::Days => write!(f, "D"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_tokens() {
        assert_eq!(Resolution::Seconds.store_unit_token(), "s");
        assert_eq!(Resolution::Minutes.store_unit_token(), "m");
        assert_eq!(Resolution::Hours.store_unit_token(), "h");
        assert_eq!(Resolution::Days.store_unit_token(), "d");
    }

    #[test]
    fn test_default_bucket_counts() {
        assert_eq!(Resolution::Seconds.default_bucket_count(), 30);
        assert_eq!(Resolution::Minutes.default_bucket_count(), 5);
        assert_eq!(Resolution::Hours.default_bucket_count(), 1);
        assert_eq!(Resolution::Days.default_bucket_count(), 1);
    }

    #[test]
    fn test_next_finer_chain_terminates_at_seconds() {
        for level in Resolution::ALL {
            let chain: Vec<_> = level.finer_chain().collect();
            assert_eq!(chain.first(), Some(&level));
            assert_eq!(chain.last(), Some(&Resolution::Seconds));
            // Strictly finer at every step, so no cycle
            assert!(chain.windows(2).all(|w| w[1] < w[0]));
        }

        let from_days: Vec<_> = Resolution::Days.finer_chain().collect();
        assert_eq!(
            from_days,
            vec![
                Resolution::Days,
                Resolution::Hours,
                Resolution::Minutes,
                Resolution::Seconds
            ]
        );
    }

    #[test]
    fn test_span() {
        assert_eq!(Resolution::Seconds.span(30), Some(Duration::seconds(30)));
        assert_eq!(Resolution::Minutes.span(5), Some(Duration::minutes(5)));
        assert_eq!(Resolution::Hours.span(2), Some(Duration::hours(2)));
        assert_eq!(Resolution::Days.span(1), Some(Duration::days(1)));
        assert_eq!(Resolution::Days.span(u64::MAX), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("S".parse::<Resolution>().unwrap(), Resolution::Seconds);
        assert_eq!("minutes".parse::<Resolution>().unwrap(), Resolution::Minutes);
        assert_eq!(" h ".parse::<Resolution>().unwrap(), Resolution::Hours);
        assert_eq!("D".parse::<Resolution>().unwrap(), Resolution::Days);
        assert!(matches!(
            "w".parse::<Resolution>(),
            Err(QueryError::UnknownResolution(_))
        ));
    }

    #[test]
    fn test_serde_uses_short_names() {
        let json = serde_json::to_string(&Resolution::Minutes).unwrap();
        assert_eq!(json, "\"M\"");
        let parsed: Resolution = serde_json::from_str("\"hours\"").unwrap();
        assert_eq!(parsed, Resolution::Hours);
    }
}
