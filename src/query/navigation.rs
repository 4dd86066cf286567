//! Drill-down and shortcut navigation
//!
//! A bucketed view at one resolution can be narrowed to the span of a single
//! bucket and re-grouped at the next finer resolution. Repeating the step
//! walks the rollup ladder down to an ungrouped point list:
//!
//! ```text
//! lastMonthGroupBy  [now()-30d, ∞)  GROUP BY time(1d)
//!   └─ drill-down   [d, d+1d]       GROUP BY time(1h)
//!        └─ drill-down [h, h+1h]    GROUP BY time(5m)
//!             └─ drill-down [m, m+5m]  GROUP BY time(30s)
//!                  └─ drill-down [s, s+30s]  (ungrouped)
//! ```

use crate::query::criteria::{QueryCriteria, QueryCriteriaBuilder};
use crate::query::error::{QueryError, QueryResult};
use crate::query::relative::RelativeTime;
use crate::query::resolution::Resolution;
use chrono::{DateTime, SecondsFormat, Utc};

/// Aggregates selected by every grouped shortcut
pub const DEFAULT_AGGREGATE_SELECT_CRITERIA: [&str; 4] =
    ["median(*)", "mean(*)", "max(*)", "min(*)"];

/// Render an instant as a UTC RFC 3339 timestamp (`2024-01-01T00:00:00Z`).
///
/// Sub-second digits are only written when present.
pub fn to_zulu(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parameters of one drill-down step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillDown {
    /// Window start, as a Zulu timestamp
    pub from: String,
    /// Window end, as a Zulu timestamp
    pub to: String,
    /// Selection carried into the finer view; empty once the view is ungrouped
    pub select_criteria: Vec<String>,
    /// Grouping of the finer view, `None` below [`Resolution::Seconds`]
    pub interval: Option<(u64, Resolution)>,
}

impl DrillDown {
    /// Compute the step for the bucket `[from, from + interval_value × unit]`
    pub fn compute(
        from: DateTime<Utc>,
        interval_value: u64,
        unit: Resolution,
        select_criteria: &[String],
    ) -> QueryResult<Self> {
        let span = unit.span(interval_value).ok_or_else(|| {
            QueryError::InvalidTimeRange(format!("{}{} is too wide", interval_value, unit))
        })?;
        let end = from.checked_add_signed(span).ok_or_else(|| {
            QueryError::InvalidTimeRange(format!("{} + {}{} overflows", to_zulu(from), interval_value, unit))
        })?;

        let (select_criteria, interval) = match unit.next_finer() {
            Some(finer) => (
                select_criteria.to_vec(),
                Some((finer.default_bucket_count(), finer)),
            ),
            None => (Vec::new(), None),
        };

        Ok(Self {
            from: to_zulu(from),
            to: to_zulu(end),
            select_criteria,
            interval,
        })
    }

    /// Apply this step's window, selection and grouping to a builder
    pub fn apply(&self, builder: QueryCriteriaBuilder) -> QueryCriteriaBuilder {
        builder
            .from(self.from.clone())
            .to(self.to.clone())
            .select_criteria(self.select_criteria.iter().cloned())
            .maybe_interval(self.interval)
    }

    /// Is this the bottom of the ladder?
    pub fn is_flat(&self) -> bool {
        self.interval.is_none()
    }
}

/// The fixed navigational starting points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    /// Raw points of the last minute
    LastMinute,
    /// Last 5 minutes, bucketed by seconds
    LastMinutesGroupBy,
    /// Last hour, bucketed by minutes
    LastHourGroupBy,
    /// Last day, bucketed by hours
    LastDayGroupBy,
    /// Last 30 days, bucketed by days
    LastMonthGroupBy,
}

impl Shortcut {
    pub const ALL: [Shortcut; 5] = [
        Shortcut::LastMinute,
        Shortcut::LastMinutesGroupBy,
        Shortcut::LastHourGroupBy,
        Shortcut::LastDayGroupBy,
        Shortcut::LastMonthGroupBy,
    ];

    /// Relation name used by the presentation layer
    pub fn rel(self) -> &'static str {
        match self {
            Self::LastMinute => "lastMinute",
            Self::LastMinutesGroupBy => "lastMinutesGroupBy",
            Self::LastHourGroupBy => "lastHourGroupBy",
            Self::LastDayGroupBy => "lastDayGroupBy",
            Self::LastMonthGroupBy => "lastMonthGroupBy",
        }
    }

    /// Look-back offset appended to `now()-`
    fn offset(self) -> &'static str {
        match self {
            Self::LastMinute => "1m",
            Self::LastMinutesGroupBy => "5m",
            Self::LastHourGroupBy => "1h",
            Self::LastDayGroupBy => "1d",
            Self::LastMonthGroupBy => "30d",
        }
    }

    /// Relative lower bound, e.g. `now()-1h`
    pub fn from(self) -> String {
        RelativeTime::ago(self.offset())
    }

    /// Bucketing level, `None` for the ungrouped view
    pub fn resolution(self) -> Option<Resolution> {
        match self {
            Self::LastMinute => None,
            Self::LastMinutesGroupBy => Some(Resolution::Seconds),
            Self::LastHourGroupBy => Some(Resolution::Minutes),
            Self::LastDayGroupBy => Some(Resolution::Hours),
            Self::LastMonthGroupBy => Some(Resolution::Days),
        }
    }

    /// Criteria for this preset, left open for database/table binding
    pub fn criteria(self, tenant_id: &str, id: Option<&str>) -> QueryCriteriaBuilder {
        let builder = QueryCriteria::builder()
            .tenant_id(tenant_id)
            .maybe_id(id.map(str::to_string))
            .from(self.from());

        match self.resolution() {
            Some(level) => builder
                .select_criteria(DEFAULT_AGGREGATE_SELECT_CRITERIA)
                .interval(level.default_bucket_count(), level),
            None => builder,
        }
    }
}

impl std::str::FromStr for Shortcut {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shortcut| shortcut.rel().eq_ignore_ascii_case(s))
            .ok_or_else(|| QueryError::UnknownShortcut(s.to_string()))
    }
}

impl std::fmt::Display for Shortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.rel())
    }
}
