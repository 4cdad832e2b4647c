//! Synthetic traffic generators for exercising the collector against itself.

use axum::{http::StatusCode, response::IntoResponse};
use tokio::time::{sleep, Duration};

pub async fn fast() -> &'static str {
    "Fast"
}

/// Replies after an artificial delay long enough to trip the slow-route flag.
pub async fn slow() -> &'static str {
    sleep(Duration::from_millis(900)).await;
    "Slow"
}

pub async fn error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "Fail")
}
