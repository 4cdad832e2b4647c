//! Read-side endpoints: aggregate views, raw export and the persisted tail.

pub mod test_traffic;

use crate::db::{metric_repo::MAX_RECENT_LOGS, PersistedMetric};
use crate::server::AppState;
use apipulse_models::{group_by_route, summarize, MetricRecord, MetricsSummary, RouteStats};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Write as _;
use tracing::warn;

/// `GET /api/metrics/summary`
pub async fn summary(State(state): State<AppState>) -> Json<MetricsSummary> {
    Json(summarize(&state.store.snapshot().await))
}

/// `GET /api/metrics/routes`
pub async fn routes(State(state): State<AppState>) -> Json<Vec<RouteStats>> {
    Json(group_by_route(&state.store.snapshot().await))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    /// `json` for the raw record list; anything else (or nothing) selects the
    /// delimited-text rendering.
    #[serde(rename = "type")]
    pub format: Option<String>,
}

/// `GET /api/metrics/export[?type=json]`
///
/// A malformed query string falls back to the text rendering instead of
/// rejecting the request.
pub async fn export(
    State(state): State<AppState>,
    params: Option<Query<ExportParams>>,
) -> Response {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let records = state.store.snapshot().await;

    if params.format.as_deref() == Some("json") {
        return Json(records).into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        render_csv(&records),
    )
        .into_response()
}

/// Flat rendering of the record list, one line per record, every field of
/// [`MetricRecord`] in a stable column order.
fn render_csv(records: &[MetricRecord]) -> String {
    let mut out = String::from("route,method,status,responseTime,isError,timestamp\n");
    for record in records {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            csv_field(&record.route),
            csv_field(&record.method),
            record.status,
            record.response_time_ms,
            record.is_error,
            record.timestamp.to_rfc3339(),
        );
    }
    out
}

/// Unmatched routes fall back to the raw URI path, which can carry commas;
/// quote such values so they cannot shift columns.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<PersistedMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /api/logs[?limit=N]`
///
/// Reads the persisted tail from the database, independent of the in-memory
/// store, so the dashboard can show traffic from before the last restart. A
/// read failure (or a database that never came up) degrades to an empty list
/// with an error indicator rather than a 500.
pub async fn recent_logs(
    State(state): State<AppState>,
    params: Option<Query<LogParams>>,
) -> Json<LogsResponse> {
    // An unparseable limit defaults instead of rejecting the request.
    let limit = params
        .and_then(|Query(p)| p.limit)
        .unwrap_or(MAX_RECENT_LOGS);

    let Some(db) = &state.db else {
        return Json(LogsResponse {
            logs: Vec::new(),
            error: Some("database unavailable".to_owned()),
        });
    };

    match db.metrics().recent(limit).await {
        Ok(logs) => Json(LogsResponse { logs, error: None }),
        Err(e) => {
            warn!("Log read failed: {e}");
            Json(LogsResponse {
                logs: Vec::new(),
                error: Some(e.to_string()),
            })
        }
    }
}
