use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::AppEngine;
use crate::error::AppError;
use crate::stats::{self, DailyStats, EmployeeHistoryStats, STATS_LOOKBACK};

#[derive(Debug, Deserialize, ToSchema)]
pub struct DailyStatsQuery {
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
}

/// Fleet-wide attendance counts for one date
#[utoipa::path(
    get,
    path = "/api/attendance/stats",
    params(
        ("date", Query, description = "Date (YYYY-MM-DD), default today")
    ),
    responses(
        (status = 200, description = "Daily counts", body = DailyStats),
        (status = 400, description = "Malformed date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Stats"
)]
pub async fn daily_stats(
    engine: web::Data<AppEngine>,
    query: web::Query<DailyStatsQuery>,
) -> Result<HttpResponse, AppError> {
    let date = match &query.date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("date must be YYYY-MM-DD, got '{raw}'")))?,
        None => Local::now().date_naive(),
    };

    let stats = stats::daily_stats(engine.store(), date).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Historical attendance statistics for one employee
#[utoipa::path(
    get,
    path = "/api/employees/{id}/attendance/stats",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "History statistics", body = EmployeeHistoryStats),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Stats"
)]
pub async fn employee_stats(
    engine: web::Data<AppEngine>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let stats =
        stats::employee_history_stats(engine.store(), &employee_id, STATS_LOOKBACK).await?;
    Ok(HttpResponse::Ok().json(stats))
}
