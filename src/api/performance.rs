use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::metrics::{DEFAULT_STATS_WINDOW_MS, PerformanceMonitor};

const DEFAULT_METRICS_LIMIT: usize = 50;

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatsQuery {
    /// Aggregation window in milliseconds, default 300000 (5 minutes).
    pub window: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MetricsQuery {
    pub limit: Option<usize>,
}

/// Aggregate API and DB performance statistics
#[utoipa::path(
    get,
    path = "/api/performance/stats",
    params(
        ("window", Query, description = "Aggregation window in ms, default 300000")
    ),
    responses(
        (status = 200, description = "Windowed performance statistics")
    ),
    tag = "Performance"
)]
pub async fn performance_stats(
    monitor: web::Data<PerformanceMonitor>,
    query: web::Query<StatsQuery>,
) -> Result<HttpResponse, AppError> {
    let window = query.window.unwrap_or(DEFAULT_STATS_WINDOW_MS);

    Ok(HttpResponse::Ok().json(json!({
        "api": monitor.api_stats(window),
        "database": monitor.db_stats(window),
        "timestamp": SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0),
    })))
}

/// Recent raw API and DB metrics, newest first
#[utoipa::path(
    get,
    path = "/api/performance/metrics",
    params(
        ("limit", Query, description = "Maximum entries per buffer, default 50")
    ),
    responses(
        (status = 200, description = "Recent metric entries")
    ),
    tag = "Performance"
)]
pub async fn recent_metrics(
    monitor: web::Data<PerformanceMonitor>,
    query: web::Query<MetricsQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_METRICS_LIMIT);

    Ok(HttpResponse::Ok().json(json!({
        "api": monitor.recent_api(limit),
        "database": monitor.recent_db(limit),
    })))
}
