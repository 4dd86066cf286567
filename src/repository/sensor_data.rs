//! Sensor data repository

use crate::config::StoreConfig;
use crate::mapping::ResultMapper;
use crate::model::SensorData;
use crate::query::{BoundQuery, QueryCriteria};
use crate::repository::{QueryExecutor, RepositoryResult};
use tracing::Instrument;

/// Aggregate selecting the latest value of every field
const LAST_VALUE_SELECT: &str = "last(*)";

/// Group columns that yield one series per sensor
const LAST_VALUE_GROUP_BY: [&str; 2] = ["tenantId", "id"];

/// Reads [`SensorData`] through a [`QueryExecutor`]
pub struct SensorDataRepository<E> {
    executor: E,
    database: String,
    measurement: String,
    mapper: ResultMapper,
}

impl<E: QueryExecutor> SensorDataRepository<E> {
    pub fn new(executor: E, store: &StoreConfig) -> Self {
        Self {
            executor,
            database: store.database.clone(),
            measurement: store.measurement.clone(),
            mapper: ResultMapper::with_precision(store.precision),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run caller criteria against the configured database and measurement.
    /// Any database or table already on the criteria is replaced.
    pub async fn find_all_by_criteria(
        &self,
        criteria: &QueryCriteria,
    ) -> RepositoryResult<Vec<SensorData>> {
        let query = self.bind(criteria)?;
        self.query(&query).await
    }

    /// Latest value of every sensor of a tenant
    pub async fn find_last_values(&self, tenant_id: &str) -> RepositoryResult<Vec<SensorData>> {
        let criteria = QueryCriteria::builder()
            .tenant_id(tenant_id)
            .select(LAST_VALUE_SELECT)
            .group_by_criteria(LAST_VALUE_GROUP_BY)
            .build()?;
        self.find_all_by_criteria(&criteria).await
    }

    /// Latest value of one sensor
    pub async fn find_last_value(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> RepositoryResult<Vec<SensorData>> {
        let criteria = QueryCriteria::builder()
            .tenant_id(tenant_id)
            .id(id)
            .select(LAST_VALUE_SELECT)
            .group_by_criteria(LAST_VALUE_GROUP_BY)
            .build()?;
        self.find_all_by_criteria(&criteria).await
    }

    /// Execute an already bound statement and decode the response
    pub async fn query(&self, query: &BoundQuery) -> RepositoryResult<Vec<SensorData>> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("query", %request_id);
        self.execute_and_decode(query).instrument(span).await
    }

    async fn execute_and_decode(&self, query: &BoundQuery) -> RepositoryResult<Vec<SensorData>> {
        tracing::debug!(
            database = query.database().unwrap_or_default(),
            command = query.command(),
            "Executing query"
        );

        let response = self.executor.execute(query).await.map_err(|e| {
            tracing::warn!(error = %e, "Query execution failed");
            e
        })?;

        let records = self
            .mapper
            .to_records_from::<SensorData>(&response, &self.measurement)
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to decode query response");
                e
            })?;

        tracing::info!(records = records.len(), "Query completed");
        Ok(records)
    }

    fn bind(&self, criteria: &QueryCriteria) -> RepositoryResult<BoundQuery> {
        let query = criteria
            .to_builder()
            .database(self.database.as_str())
            .table(self.measurement.as_str())
            .build()?
            .to_query()?;
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{QueryResponse, Series};
    use crate::query::{QueryError, Resolution};
    use crate::repository::RepositoryError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every statement and answers with a canned response
    struct FakeExecutor {
        response: Result<QueryResponse, String>,
        seen: Mutex<Vec<BoundQuery>>,
    }

    impl FakeExecutor {
        fn answering(response: QueryResponse) -> Self {
            Self {
                response: Ok(response),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_command(&self) -> String {
            self.seen
                .lock()
                .unwrap()
                .last()
                .map(|q| q.command().to_string())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl QueryExecutor for FakeExecutor {
        async fn execute(&self, query: &BoundQuery) -> RepositoryResult<QueryResponse> {
            self.seen.lock().unwrap().push(query.clone());
            self.response.clone().map_err(RepositoryError::Executor)
        }
    }

    fn sample_response() -> QueryResponse {
        QueryResponse::with_series(vec![Series::new("sensorData")
            .columns(["time", "temperature"])
            .row(vec![json!("2024-01-01T00:00:00Z"), json!(21.5)])])
    }

    fn repository(executor: FakeExecutor) -> SensorDataRepository<FakeExecutor> {
        SensorDataRepository::new(executor, &StoreConfig::default())
    }

    #[tokio::test]
    async fn test_find_all_rebinds_database_and_table() {
        let repo = repository(FakeExecutor::answering(sample_response()));

        let criteria = QueryCriteria::builder()
            .database("elsewhere")
            .table("otherTable")
            .tenant_id("t1")
            .id("s1")
            .from("now()-5m")
            .select("mean(*)")
            .interval(30, Resolution::Seconds)
            .build()
            .unwrap();

        let data = repo.find_all_by_criteria(&criteria).await.unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].get("temperature"), Some(&json!(21.5)));

        let seen = repo.executor().seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].database(), Some("iot"));
        assert_eq!(
            seen[0].command(),
            "SELECT mean(*) FROM sensorData WHERE tenantId = 't1' AND id = 's1' AND time >= now()-5m GROUP BY time(30s);"
        );
    }

    #[tokio::test]
    async fn test_find_last_values() {
        let response = QueryResponse::with_series(vec![
            Series::new("sensorData")
                .columns(["time", "last_temperature"])
                .row(vec![json!("2024-01-01T00:00:00Z"), json!(21.5)])
                .tag("tenantId", "t1")
                .tag("id", "s1"),
            Series::new("sensorData")
                .columns(["time", "last_temperature"])
                .row(vec![json!("2024-01-01T00:00:10Z"), json!(19.0)])
                .tag("tenantId", "t1")
                .tag("id", "s2"),
        ]);
        let repo = repository(FakeExecutor::answering(response));

        let data = repo.find_last_values("t1").await.unwrap();
        assert_eq!(
            repo.executor().last_command(),
            "SELECT last(*) FROM sensorData WHERE tenantId = 't1' GROUP BY tenantId,id;"
        );
        let ids: Vec<_> = data.iter().filter_map(|d| d.get("id")).collect();
        assert_eq!(ids, vec![&json!("s1"), &json!("s2")]);
    }

    #[tokio::test]
    async fn test_find_last_value() {
        let repo = repository(FakeExecutor::answering(sample_response()));

        repo.find_last_value("t1", "s1").await.unwrap();
        assert_eq!(
            repo.executor().last_command(),
            "SELECT last(*) FROM sensorData WHERE tenantId = 't1' AND id = 's1' GROUP BY tenantId,id;"
        );
    }

    #[tokio::test]
    async fn test_missing_tenant_never_reaches_executor() {
        let repo = repository(FakeExecutor::answering(sample_response()));

        let result = repo.find_last_values("  ").await;
        assert!(matches!(
            result,
            Err(RepositoryError::Query(QueryError::MissingTenant))
        ));
        assert!(repo.executor().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_executor_failure() {
        let repo = repository(FakeExecutor::failing("connection refused"));

        let query = BoundQuery::new(Some("iot".into()), "SELECT * FROM sensorData;");
        let result = repo.query(&query).await;
        assert!(matches!(result, Err(RepositoryError::Executor(msg)) if msg == "connection refused"));
    }

    #[tokio::test]
    async fn test_store_error_surfaces_as_mapping_error() {
        let mut response = sample_response();
        response.results[0].error = Some("retention policy not found".into());
        let repo = repository(FakeExecutor::answering(response));

        let result = repo.find_last_values("t1").await;
        assert!(matches!(result, Err(RepositoryError::Mapping(_))));
    }

    #[tokio::test]
    async fn test_custom_measurement() {
        let store = StoreConfig {
            measurement: "readings".into(),
            ..StoreConfig::default()
        };
        let response = QueryResponse::with_series(vec![Series::new("readings")
            .columns(["time", "value"])
            .row(vec![json!("2024-01-01T00:00:00Z"), json!(1.0)])]);
        let repo = SensorDataRepository::new(FakeExecutor::answering(response), &store);

        let criteria = QueryCriteria::builder().tenant_id("t1").build().unwrap();
        let data = repo.find_all_by_criteria(&criteria).await.unwrap();

        assert_eq!(data.len(), 1);
        assert_eq!(
            repo.executor().last_command(),
            "SELECT * FROM readings WHERE tenantId = 't1';"
        );
    }
}
