//! In-process performance observer: two capped ring buffers of recent API
//! and database timings, shared process-wide via `Arc` and read back by the
//! `/performance` endpoints. Nothing here is ever persisted.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use utoipa::ToSchema;

/// Requests slower than this are counted as slow and logged.
pub const SLOW_API_MS: u64 = 1000;
/// Queries slower than this are counted as slow and logged.
pub const SLOW_DB_MS: u64 = 500;

/// Default aggregation window: last 5 minutes.
pub const DEFAULT_STATS_WINDOW_MS: u64 = 300_000;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetric {
    /// Unix millis.
    pub timestamp: u64,
    pub method: String,
    pub path: String,
    pub response_time_ms: u64,
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DbMetric {
    /// Unix millis.
    pub timestamp: u64,
    /// Query label, truncated to 100 chars.
    pub query: String,
    pub duration_ms: u64,
    pub success: bool,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiStats {
    pub total_requests: usize,
    pub average_response_time: u64,
    pub slow_requests: usize,
    /// Percentage of responses with status >= 400, rounded to 2 decimals.
    pub error_rate: f64,
    pub requests_per_minute: f64,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DbStats {
    pub total_queries: usize,
    pub average_query_time: u64,
    pub slow_queries: usize,
    pub failed_queries: usize,
}

pub struct PerformanceMonitor {
    capacity: usize,
    api: Mutex<VecDeque<ApiMetric>>,
    db: Mutex<VecDeque<DbMetric>>,
}

impl PerformanceMonitor {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            api: Mutex::new(VecDeque::with_capacity(capacity)),
            db: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    fn now_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    pub fn record_api(&self, method: &str, path: &str, response_time_ms: u64, status_code: u16) {
        if response_time_ms > SLOW_API_MS {
            tracing::warn!(method, path, response_time_ms, "Slow API request");
        }
        self.push_api(ApiMetric {
            timestamp: Self::now_millis(),
            method: method.to_string(),
            path: path.to_string(),
            response_time_ms,
            status_code,
        });
    }

    pub fn record_db(&self, query: &str, duration_ms: u64, success: bool) {
        if duration_ms > SLOW_DB_MS {
            tracing::warn!(query, duration_ms, "Slow DB query");
        }
        self.push_db(DbMetric {
            timestamp: Self::now_millis(),
            query: query.chars().take(100).collect(),
            duration_ms,
            success,
        });
    }

    fn push_api(&self, metric: ApiMetric) {
        let mut buf = self.api.lock().expect("metrics buffer poisoned");
        if buf.len() == self.capacity {
            buf.pop_front();
        }
        buf.push_back(metric);
    }

    fn push_db(&self, metric: DbMetric) {
        let mut buf = self.db.lock().expect("metrics buffer poisoned");
        if buf.len() == self.capacity {
            buf.pop_front();
        }
        buf.push_back(metric);
    }

    pub fn api_stats(&self, window_ms: u64) -> ApiStats {
        let cutoff = Self::now_millis().saturating_sub(window_ms);
        let buf = self.api.lock().expect("metrics buffer poisoned");
        let recent: Vec<&ApiMetric> = buf.iter().filter(|m| m.timestamp > cutoff).collect();

        if recent.is_empty() {
            return ApiStats::default();
        }

        let total_requests = recent.len();
        let average_response_time =
            recent.iter().map(|m| m.response_time_ms).sum::<u64>() / total_requests as u64;
        let slow_requests = recent.iter().filter(|m| m.response_time_ms > SLOW_API_MS).count();
        let errors = recent.iter().filter(|m| m.status_code >= 400).count();
        let error_rate = round2(errors as f64 / total_requests as f64 * 100.0);
        let requests_per_minute = round2(total_requests as f64 / (window_ms as f64 / 60_000.0));

        ApiStats {
            total_requests,
            average_response_time,
            slow_requests,
            error_rate,
            requests_per_minute,
        }
    }

    pub fn db_stats(&self, window_ms: u64) -> DbStats {
        let cutoff = Self::now_millis().saturating_sub(window_ms);
        let buf = self.db.lock().expect("metrics buffer poisoned");
        let recent: Vec<&DbMetric> = buf.iter().filter(|m| m.timestamp > cutoff).collect();

        if recent.is_empty() {
            return DbStats::default();
        }

        let total_queries = recent.len();
        DbStats {
            total_queries,
            average_query_time: recent.iter().map(|m| m.duration_ms).sum::<u64>()
                / total_queries as u64,
            slow_queries: recent.iter().filter(|m| m.duration_ms > SLOW_DB_MS).count(),
            failed_queries: recent.iter().filter(|m| !m.success).count(),
        }
    }

    /// Last `limit` API metrics, newest first.
    pub fn recent_api(&self, limit: usize) -> Vec<ApiMetric> {
        let buf = self.api.lock().expect("metrics buffer poisoned");
        buf.iter().rev().take(limit).cloned().collect()
    }

    /// Last `limit` DB metrics, newest first.
    pub fn recent_db(&self, limit: usize) -> Vec<DbMetric> {
        let buf = self.db.lock().expect("metrics buffer poisoned");
        buf.iter().rev().take(limit).cloned().collect()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_buffer_drops_oldest_beyond_capacity() {
        let monitor = PerformanceMonitor::new(3);
        for i in 0..5u64 {
            monitor.record_api("GET", &format!("/api/employees/{i}"), i, 200);
        }
        let recent = monitor.recent_api(10);
        assert_eq!(recent.len(), 3);
        // Newest first.
        assert_eq!(recent[0].path, "/api/employees/4");
        assert_eq!(recent[2].path, "/api/employees/2");
    }

    #[test]
    fn api_stats_counts_slow_and_errors() {
        let monitor = PerformanceMonitor::new(100);
        monitor.record_api("GET", "/api/employees", 100, 200);
        monitor.record_api("POST", "/api/employees", 1500, 200);
        monitor.record_api("GET", "/api/employees/x", 200, 404);
        monitor.record_api("GET", "/api/attendance/stats", 200, 200);

        let stats = monitor.api_stats(DEFAULT_STATS_WINDOW_MS);
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.average_response_time, 500);
        assert_eq!(stats.slow_requests, 1);
        assert_eq!(stats.error_rate, 25.0);
    }

    #[test]
    fn stats_ignore_metrics_outside_window() {
        let monitor = PerformanceMonitor::new(100);
        monitor.push_api(ApiMetric {
            timestamp: PerformanceMonitor::now_millis() - 600_000,
            method: "GET".into(),
            path: "/api/employees".into(),
            response_time_ms: 5000,
            status_code: 200,
        });
        monitor.record_api("GET", "/api/employees", 100, 200);

        let stats = monitor.api_stats(DEFAULT_STATS_WINDOW_MS);
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.slow_requests, 0);
    }

    #[test]
    fn empty_window_yields_zeroed_stats() {
        let monitor = PerformanceMonitor::new(10);
        let api = monitor.api_stats(DEFAULT_STATS_WINDOW_MS);
        assert_eq!(api.total_requests, 0);
        assert_eq!(api.error_rate, 0.0);
        let db = monitor.db_stats(DEFAULT_STATS_WINDOW_MS);
        assert_eq!(db.total_queries, 0);
    }

    #[test]
    fn db_stats_count_failures() {
        let monitor = PerformanceMonitor::new(10);
        monitor.record_db("SELECT * FROM employees", 10, true);
        monitor.record_db("UPDATE attendance_records", 600, true);
        monitor.record_db("INSERT INTO attendance_records", 20, false);

        let stats = monitor.db_stats(DEFAULT_STATS_WINDOW_MS);
        assert_eq!(stats.total_queries, 3);
        assert_eq!(stats.slow_queries, 1);
        assert_eq!(stats.failed_queries, 1);
    }

    #[test]
    fn long_query_labels_are_truncated() {
        let monitor = PerformanceMonitor::new(10);
        let long = "x".repeat(300);
        monitor.record_db(&long, 1, true);
        assert_eq!(monitor.recent_db(1)[0].query.len(), 100);
    }
}
