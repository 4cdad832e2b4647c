use apipulse_server::{
    db::Database,
    server::{build_router, AppState},
    store::MetricStore,
};
use std::net::SocketAddr;
use std::time::Duration;

async fn spawn_app(db: Option<Database>) -> (SocketAddr, MetricStore) {
    let store = MetricStore::with_capacity(1024);
    let state = AppState {
        store: store.clone(),
        db,
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port binds");
    let addr = listener.local_addr().expect("listener has an address");

    tokio::spawn(async move {
        axum::serve(listener, build_router(state))
            .await
            .expect("test server runs");
    });

    (addr, store)
}

async fn get_json(addr: SocketAddr, path: &str) -> serde_json::Value {
    reqwest::get(format!("http://{addr}{path}"))
        .await
        .expect("request succeeds")
        .json()
        .await
        .expect("body is JSON")
}

#[tokio::test]
async fn three_fast_and_one_error_yield_a_quarter_error_rate() {
    let (addr, _store) = spawn_app(None).await;

    for _ in 0..3 {
        let resp = reqwest::get(format!("http://{addr}/api/test/fast")).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.text().await.unwrap(), "Fast");
    }
    let resp = reqwest::get(format!("http://{addr}/api/test/error")).await.unwrap();
    assert_eq!(resp.status(), 500);

    let summary = get_json(addr, "/api/metrics/summary").await;
    assert_eq!(summary["totalRequests"], 4);
    assert_eq!(summary["errorRate"].as_f64().unwrap(), 25.0);
}

#[tokio::test]
async fn slow_endpoint_records_its_delay_and_trips_the_slow_flag() {
    let (addr, store) = spawn_app(None).await;

    reqwest::get(format!("http://{addr}/api/test/slow")).await.unwrap();

    let snapshot = store.snapshot().await;
    let slow = snapshot
        .iter()
        .find(|r| r.route == "/api/test/slow")
        .expect("slow request was captured");
    assert!(
        slow.response_time_ms >= 900,
        "expected >= 900ms, got {}",
        slow.response_time_ms
    );

    let routes = get_json(addr, "/api/metrics/routes").await;
    let slow_stats = routes
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["route"] == "/api/test/slow")
        .expect("slow route is grouped");
    assert_eq!(slow_stats["hits"], 1);
    assert_eq!(slow_stats["isSlow"], true);
}

#[tokio::test]
async fn read_endpoints_stay_up_without_a_database() {
    let (addr, _store) = spawn_app(None).await;

    // First request in: nothing captured yet when the handler runs.
    let summary = get_json(addr, "/api/metrics/summary").await;
    assert_eq!(summary["totalRequests"], 0);
    assert_eq!(summary["avgResponseTime"].as_f64().unwrap(), 0.0);
    assert_eq!(summary["errorRate"].as_f64().unwrap(), 0.0);

    let routes = get_json(addr, "/api/metrics/routes").await;
    assert!(routes.is_array());

    let logs = get_json(addr, "/api/logs").await;
    assert_eq!(logs["logs"].as_array().unwrap().len(), 0);
    assert!(logs["error"].is_string());
}

#[tokio::test]
async fn export_renderings_cover_the_captured_traffic() {
    let (addr, _store) = spawn_app(None).await;

    reqwest::get(format!("http://{addr}/api/test/fast")).await.unwrap();

    let raw = get_json(addr, "/api/metrics/export?type=json").await;
    let records = raw.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["route"], "/api/test/fast");
    assert_eq!(records[0]["method"], "GET");
    assert_eq!(records[0]["status"], 200);
    assert_eq!(records[0]["isError"], false);

    let resp = reqwest::get(format!("http://{addr}/api/metrics/export")).await.unwrap();
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let body = resp.text().await.unwrap();
    let mut lines = body.lines();
    assert_eq!(
        lines.next().unwrap(),
        "route,method,status,responseTime,isError,timestamp"
    );
    assert!(lines.any(|l| l.starts_with("/api/test/fast,GET,200,")));
}

#[tokio::test]
async fn captured_traffic_is_mirrored_into_sqlite_newest_first() {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}/metrics.db", dir.path().display());
    let db = Database::connect(&url).await.expect("sqlite opens");

    let (addr, _store) = spawn_app(Some(db)).await;

    reqwest::get(format!("http://{addr}/api/test/fast")).await.unwrap();
    reqwest::get(format!("http://{addr}/api/test/error")).await.unwrap();

    // Inserts are detached from the request path; poll until both landed.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    let test_rows = loop {
        let logs = get_json(addr, "/api/logs").await;
        assert!(logs["error"].is_null());

        let rows: Vec<serde_json::Value> = logs["logs"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|row| row["route"].as_str().unwrap().starts_with("/api/test/"))
            .cloned()
            .collect();
        if rows.len() == 2 {
            break rows;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "mirror writes did not land in time"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    };

    // Newest first: the error request completed after the fast one.
    assert_eq!(test_rows[0]["route"], "/api/test/error");
    assert_eq!(test_rows[0]["status"], 500);
    assert_eq!(test_rows[0]["isError"], true);
    assert_eq!(test_rows[1]["route"], "/api/test/fast");
    assert_eq!(test_rows[1]["isError"], false);
}

#[tokio::test]
async fn status_reports_online() {
    let (addr, _store) = spawn_app(None).await;

    let status = get_json(addr, "/status").await;
    assert_eq!(status["status"], "online");
    assert!(status["version"].is_string());
}
