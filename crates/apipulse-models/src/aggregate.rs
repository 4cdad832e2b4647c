use crate::MetricRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mean latency above which a route is flagged slow, in milliseconds.
/// The boundary itself is not slow: a 500 ms mean passes, 500.01 does not.
pub const SLOW_ROUTE_THRESHOLD_MS: f64 = 500.0;

/// Lifetime totals over the full record set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub avg_response_time: f64,
    /// Percentage of requests with status >= 400, 0..=100.
    pub error_rate: f64,
}

/// Per-route rollup derived fresh on every query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub route: String,
    pub hits: u64,
    pub avg_response_time: f64,
    pub error_percent: f64,
    pub is_slow: bool,
}

/// Compute lifetime totals for a snapshot of records.
///
/// An empty snapshot yields an all-zero summary rather than dividing by zero.
#[must_use]
pub fn summarize(records: &[MetricRecord]) -> MetricsSummary {
    if records.is_empty() {
        return MetricsSummary::default();
    }

    let total = records.len() as u64;
    let errors = records.iter().filter(|r| r.is_error).count() as u64;
    let total_time: u64 = records.iter().map(|r| r.response_time_ms).sum();

    MetricsSummary {
        total_requests: total,
        avg_response_time: total_time as f64 / total as f64,
        error_rate: errors as f64 / total as f64 * 100.0,
    }
}

#[derive(Default)]
struct RouteAccumulator {
    hits: u64,
    errors: u64,
    total_time_ms: u64,
}

/// Partition records by route and compute per-group hit count, mean latency,
/// error percentage and the slow flag.
///
/// Output order is the first-occurrence order of each route in the snapshot.
#[must_use]
pub fn group_by_route(records: &[MetricRecord]) -> Vec<RouteStats> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, RouteAccumulator> = HashMap::new();

    for record in records {
        let acc = groups.entry(record.route.as_str()).or_insert_with(|| {
            order.push(record.route.as_str());
            RouteAccumulator::default()
        });
        acc.hits += 1;
        acc.total_time_ms += record.response_time_ms;
        if record.is_error {
            acc.errors += 1;
        }
    }

    order
        .into_iter()
        .map(|route| {
            let acc = &groups[route];
            let avg = acc.total_time_ms as f64 / acc.hits as f64;
            RouteStats {
                route: route.to_owned(),
                hits: acc.hits,
                avg_response_time: avg,
                error_percent: acc.errors as f64 / acc.hits as f64 * 100.0,
                is_slow: avg > SLOW_ROUTE_THRESHOLD_MS,
            }
        })
        .collect()
}
