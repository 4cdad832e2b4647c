use apipulse_models::MetricRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqlitePool;

use crate::error::ApiResult;

/// Most rows a single read may return, regardless of what the caller asks for.
pub const MAX_RECENT_LOGS: u32 = 50;

/// One row of the `api_metrics` mirror table, as served by `/api/logs`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PersistedMetric {
    pub id: i64,
    pub route: String,
    pub method: String,
    pub status: i64,
    #[serde(rename = "responseTime")]
    pub response_time_ms: i64,
    pub is_error: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct MetricRepository {
    pool: SqlitePool,
}

impl MetricRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, record: &MetricRecord) -> ApiResult<()> {
        sqlx::query(
            r#"
            INSERT INTO api_metrics (route, method, status, response_time_ms, is_error, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&record.route)
        .bind(&record.method)
        .bind(i64::from(record.status))
        .bind(i64::try_from(record.response_time_ms).unwrap_or(i64::MAX))
        .bind(record.is_error)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The most recently persisted rows, newest first. `limit` is clamped to
    /// [`MAX_RECENT_LOGS`].
    pub async fn recent(&self, limit: u32) -> ApiResult<Vec<PersistedMetric>> {
        let limit = limit.min(MAX_RECENT_LOGS);

        let rows = sqlx::query_as::<_, PersistedMetric>(
            r#"
            SELECT id, route, method, status, response_time_ms, is_error, created_at
            FROM api_metrics
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
