//! Ingestion middleware: one MetricRecord per completed request.

use crate::server::AppState;
use apipulse_models::MetricRecord;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, warn};

/// Axum middleware that wraps every route.
///
/// On response completion it appends a record to the in-memory store
/// unconditionally, then fires one detached best-effort insert into the
/// database mirror. A failed insert is logged and swallowed; the response has
/// already been produced and is never affected.
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let started = Instant::now();

    let method = request.method().as_str().to_owned();

    // Prefer the matched route pattern over the raw path so dynamic segments
    // do not fan out into one group per value.
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let record = MetricRecord::capture(route, method, response.status().as_u16(), elapsed_ms);

    debug!(
        route = %record.route,
        status = record.status,
        elapsed_ms,
        "captured request"
    );

    state.store.record(record.clone()).await;

    // Mirror into the database off the request path. One attempt, no timeout,
    // no retry; the in-memory copy is authoritative for the aggregate views.
    if let Some(db) = state.db.clone() {
        tokio::spawn(async move {
            if let Err(e) = db.metrics().insert(&record).await {
                warn!("Metric insert failed: {e}");
            }
        });
    }

    response
}
