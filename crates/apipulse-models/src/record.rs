use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One captured HTTP request: its route, verb, final status and wall-clock
/// duration from arrival to response completion.
///
/// Records are immutable once built. The capture layer appends them in
/// completion order, which under concurrent traffic is not necessarily
/// arrival order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    pub route: String,
    pub method: String,
    pub status: u16,
    #[serde(rename = "responseTime")]
    pub response_time_ms: u64,
    pub is_error: bool,
    pub timestamp: DateTime<Utc>,
}

impl MetricRecord {
    /// Build a record from an observed request. `is_error` is derived from
    /// the status code; the timestamp is assigned here, at capture.
    #[must_use]
    pub fn capture(route: String, method: String, status: u16, response_time_ms: u64) -> Self {
        Self {
            route,
            method,
            status,
            response_time_ms,
            is_error: status >= 400,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_flag_starts_at_400() {
        assert!(!MetricRecord::capture("/a".into(), "GET".into(), 399, 1).is_error);
        assert!(MetricRecord::capture("/a".into(), "GET".into(), 400, 1).is_error);
        assert!(MetricRecord::capture("/a".into(), "GET".into(), 500, 1).is_error);
    }

    #[test]
    fn serializes_with_camel_case_api_field_names() {
        let record = MetricRecord::capture("/api/test/fast".into(), "GET".into(), 200, 12);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["route"], "/api/test/fast");
        assert_eq!(json["method"], "GET");
        assert_eq!(json["status"], 200);
        assert_eq!(json["responseTime"], 12);
        assert_eq!(json["isError"], false);
        assert!(json["timestamp"].is_string());
    }
}
