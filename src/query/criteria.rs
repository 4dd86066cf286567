//! Query criteria
//!
//! [`QueryCriteria`] is the immutable description of one request: which
//! tenant, which series, which time window, which selection expressions and
//! how to bucket. It is produced by [`QueryCriteriaBuilder`], validated once in
//! [`QueryCriteriaBuilder::build`], and consumed by the statement renderer.
//!
//! ```rust
//! use tsa::query::{QueryCriteria, Resolution};
//!
//! let criteria = QueryCriteria::builder()
//!     .table("sensorData")
//!     .tenant_id("t1")
//!     .id("s1")
//!     .from("now()-5m")
//!     .select("mean(*)")
//!     .interval(30, Resolution::Seconds)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     criteria.to_query().unwrap().command(),
//!     "SELECT mean(*) FROM sensorData WHERE tenantId = 't1' AND id = 's1' AND time >= now()-5m GROUP BY time(30s);"
//! );
//! ```

use crate::mapping::Measurement;
use crate::query::error::{QueryError, QueryResult};
use crate::query::navigation::DrillDown;
use crate::query::relative::TimeBound;
use crate::query::resolution::Resolution;
use crate::query::statement::{self, BoundQuery};
use chrono::{DateTime, Utc};

/// Validated, immutable query criteria
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCriteria {
    database: Option<String>,
    table: Option<String>,
    tenant_id: String,
    id: Option<String>,
    from: Option<String>,
    to: Option<String>,
    select_criteria: Vec<String>,
    interval_value: Option<u64>,
    interval_unit: Option<Resolution>,
    group_by_criteria: Vec<String>,
}

impl QueryCriteria {
    /// Start building criteria
    pub fn builder() -> QueryCriteriaBuilder {
        QueryCriteriaBuilder::default()
    }

    /// Copy these criteria back into a builder, e.g. to rebind the database
    pub fn to_builder(&self) -> QueryCriteriaBuilder {
        QueryCriteriaBuilder {
            database: self.database.clone(),
            table: self.table.clone(),
            tenant_id: Some(self.tenant_id.clone()),
            id: self.id.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
            select_criteria: self.select_criteria.clone(),
            interval_value: self.interval_value,
            interval_unit: self.interval_unit,
            group_by_criteria: self.group_by_criteria.clone(),
        }
    }

    /// Render to a store query bound to this criteria's database
    pub fn to_query(&self) -> QueryResult<BoundQuery> {
        statement::render(self)
    }

    /// Render for record type `T`; without an explicit table the query runs
    /// against `T::MEASUREMENT`
    pub fn to_query_for<T: Measurement>(&self) -> QueryResult<BoundQuery> {
        statement::render_or(self, T::MEASUREMENT)
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Entity id, `None` when absent or empty
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    /// Lower bound, classified
    pub fn from_bound(&self) -> Option<TimeBound> {
        self.from.as_deref().and_then(TimeBound::classify)
    }

    /// Upper bound, classified
    pub fn to_bound(&self) -> Option<TimeBound> {
        self.to.as_deref().and_then(TimeBound::classify)
    }

    pub fn select_criteria(&self) -> &[String] {
        &self.select_criteria
    }

    pub fn interval_value(&self) -> Option<u64> {
        self.interval_value
    }

    pub fn interval_unit(&self) -> Option<Resolution> {
        self.interval_unit
    }

    /// Bucket width and unit, only when both are present
    pub fn interval(&self) -> Option<(u64, Resolution)> {
        self.interval_value.zip(self.interval_unit)
    }

    pub fn group_by_criteria(&self) -> &[String] {
        &self.group_by_criteria
    }

    /// Grouping that will actually be applied.
    ///
    /// Explicit grouping columns take precedence over the time bucket.
    pub fn grouping(&self) -> Grouping<'_> {
        if !self.group_by_criteria.is_empty() {
            Grouping::Columns(&self.group_by_criteria)
        } else if let Some((value, unit)) = self.interval() {
            Grouping::Time { value, unit }
        } else {
            Grouping::None
        }
    }

    /// Criteria for the next finer view of the bucket starting at `bucket_start`.
    ///
    /// Returns `None` when these criteria are not time-bucketed.
    pub fn drill_down(&self, bucket_start: DateTime<Utc>) -> QueryResult<Option<QueryCriteria>> {
        let Some((value, unit)) = self.interval() else {
            return Ok(None);
        };

        let step = DrillDown::compute(bucket_start, value, unit, &self.select_criteria)?;
        let mut builder = self.to_builder();
        builder.group_by_criteria.clear();
        step.apply(builder).build().map(Some)
    }
}

/// Grouping clause selected for a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping<'a> {
    /// No GROUP BY
    None,
    /// `GROUP BY c1,c2` over tag columns
    Columns(&'a [String]),
    /// `GROUP BY time(<value><unit>)`
    Time { value: u64, unit: Resolution },
}

/// Builder for [`QueryCriteria`]
///
/// Every option is optional except the tenant id, which is checked in
/// [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct QueryCriteriaBuilder {
    database: Option<String>,
    table: Option<String>,
    tenant_id: Option<String>,
    id: Option<String>,
    from: Option<String>,
    to: Option<String>,
    select_criteria: Vec<String>,
    interval_value: Option<u64>,
    interval_unit: Option<Resolution>,
    group_by_criteria: Vec<String>,
}

impl QueryCriteriaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Database the query is bound to
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Measurement to select from
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set or clear the entity id
    pub fn maybe_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    /// Lower bound: a timestamp literal or a `now()` expression
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn maybe_from(mut self, from: Option<String>) -> Self {
        self.from = from;
        self
    }

    /// Upper bound: a timestamp literal or a `now()` expression
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn maybe_to(mut self, to: Option<String>) -> Self {
        self.to = to;
        self
    }

    /// Lower bound at an absolute instant
    pub fn from_instant(self, from: DateTime<Utc>) -> Self {
        self.from(crate::query::navigation::to_zulu(from))
    }

    /// Upper bound at an absolute instant
    pub fn to_instant(self, to: DateTime<Utc>) -> Self {
        self.to(crate::query::navigation::to_zulu(to))
    }

    /// Append one raw selection expression
    pub fn select(mut self, expression: impl Into<String>) -> Self {
        self.select_criteria.push(expression.into());
        self
    }

    /// Replace the selection expressions
    pub fn select_criteria<I, S>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_criteria = expressions.into_iter().map(Into::into).collect();
        self
    }

    pub fn interval_value(mut self, value: u64) -> Self {
        self.interval_value = Some(value);
        self
    }

    pub fn interval_unit(mut self, unit: Resolution) -> Self {
        self.interval_unit = Some(unit);
        self
    }

    /// Bucket rows into `value` units of `unit`
    pub fn interval(self, value: u64, unit: Resolution) -> Self {
        self.interval_value(value).interval_unit(unit)
    }

    /// Set or clear the time bucket
    pub fn maybe_interval(mut self, interval: Option<(u64, Resolution)>) -> Self {
        self.interval_value = interval.map(|(value, _)| value);
        self.interval_unit = interval.map(|(_, unit)| unit);
        self
    }

    /// Group by the given tag columns instead of a time bucket
    pub fn group_by_criteria<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by_criteria = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Validate and freeze the criteria
    pub fn build(self) -> QueryResult<QueryCriteria> {
        let tenant_id = self
            .tenant_id
            .filter(|t| !t.trim().is_empty())
            .ok_or(QueryError::MissingTenant)?;

        if self.interval_value == Some(0) {
            return Err(QueryError::InvalidInterval(
                "bucket width must be greater than zero".to_string(),
            ));
        }

        Ok(QueryCriteria {
            database: self.database.filter(|d| !d.is_empty()),
            table: self.table.filter(|t| !t.is_empty()),
            tenant_id,
            id: self.id.filter(|id| !id.is_empty()),
            from: self.from.filter(|f| !f.is_empty()),
            to: self.to.filter(|t| !t.is_empty()),
            select_criteria: self.select_criteria,
            interval_value: self.interval_value,
            interval_unit: self.interval_unit,
            group_by_criteria: self.group_by_criteria,
        })
    }
}
