use crate::{api, capture, db::Database, error::ApiError, store::MetricStore, ServerArgs};
use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, Router},
    Json,
};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: MetricStore,
    /// None when the database could not be opened at startup; the collector
    /// then runs in-memory only.
    pub db: Option<Database>,
}

#[derive(Serialize, Deserialize)]
struct Status {
    status: String,
    version: String,
}

pub async fn run_server(args: ServerArgs) -> crate::Result<()> {
    info!("Starting apipulse server...");

    let addr = SocketAddr::from((args.host, args.port));

    let db = open_database(&args.database_url).await?;

    let state = AppState {
        store: MetricStore::with_capacity(args.store_capacity),
        db,
    };

    let mut app = build_router(state);

    if let Some(ref cors_domain) = args.cors_domain {
        app = app.layer(cors_layer(cors_domain));
        info!("CORS enabled for domain: {}", cors_domain);
    }

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(crate::ServerBindSnafu)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown_signal())
        .await
        .context(crate::ServerStartSnafu)?;

    Ok(())
}

/// Open the SQLite mirror. A malformed database URL is a configuration
/// mistake and aborts startup; a database that merely cannot be opened
/// degrades the collector to in-memory-only metrics.
async fn open_database(database_url: &str) -> crate::Result<Option<Database>> {
    match Database::connect(database_url).await {
        Ok(db) => Ok(Some(db)),
        Err(e @ ApiError::InvalidDatabaseUrl { .. }) => {
            Err(crate::Error::DatabaseInit { source: e })
        }
        Err(e) => {
            warn!("Database unavailable, running with in-memory metrics only: {e}");
            Ok(None)
        }
    }
}

/// Assemble the full route table with the capture middleware wrapped around
/// every endpoint, the metrics endpoints included. Filtering self-referential
/// traffic out of the display is the dashboard's concern, not ours.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/status", get(status_handler))
        // Aggregate and raw views
        .route("/api/metrics/summary", get(api::summary))
        .route("/api/metrics/routes", get(api::routes))
        .route("/api/metrics/export", get(api::export))
        .route("/api/logs", get(api::recent_logs))
        // Synthetic traffic
        .route("/api/test/fast", get(api::test_traffic::fast))
        .route("/api/test/slow", get(api::test_traffic::slow))
        .route("/api/test/error", get(api::test_traffic::error))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            capture::track_requests,
        ))
        .with_state(state)
}

fn cors_layer(cors_domain: &str) -> CorsLayer {
    if cors_domain == "*" {
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any);
    }

    let pattern = cors_domain.to_owned();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _request_parts| {
            let origin = origin.to_str().unwrap_or("");
            match pattern.split_once('*') {
                Some((prefix, suffix)) => origin.starts_with(prefix) && origin.ends_with(suffix),
                None => origin == pattern,
            }
        }))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn status_handler() -> impl IntoResponse {
    Json(Status {
        status: "online".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn malformed_database_url_aborts_startup() {
        let err = open_database("postgres://metrics").await.unwrap_err();
        assert!(matches!(err, crate::Error::DatabaseInit { .. }));
    }

    #[tokio::test]
    async fn unreachable_database_degrades_to_in_memory() {
        // Parent directory does not exist, so the file cannot be created.
        let db = open_database("sqlite:///no-such-dir/deeper/metrics.db")
            .await
            .expect("unavailability must not abort startup");
        assert!(db.is_none());
    }
}
