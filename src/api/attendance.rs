use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::api::AppEngine;
use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::store::RecordStore;

const DEFAULT_HISTORY_LIMIT: u32 = 30;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetAttendanceRequest {
    #[schema(example = "2024-06-01")]
    pub date: String,
    pub status: Option<AttendanceStatus>,
    /// Wall-clock `HH:MM` on `date`; an empty string counts as absent.
    #[schema(example = "09:00", nullable = true)]
    pub checkin_time: Option<String>,
    #[schema(example = "18:00", nullable = true)]
    pub checkout_time: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkChange {
    pub employee_id: String,
    #[schema(example = "2024-06-01")]
    pub date: String,
    pub status: Option<AttendanceStatus>,
    #[schema(example = "09:00", nullable = true)]
    pub checkin_time: Option<String>,
    #[schema(example = "18:00", nullable = true)]
    pub checkout_time: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkUpdateRequest {
    pub changes: Vec<BulkChange>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

fn parse_date(date: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("date must be YYYY-MM-DD, got '{date}'")))
}

/// `HH:MM` on the given date; empty or missing input means no time at all.
fn parse_time_on(
    date: NaiveDate,
    time: Option<&str>,
) -> Result<Option<NaiveDateTime>, AppError> {
    match time.map(str::trim) {
        None | Some("") => Ok(None),
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M")
            .map(|parsed| Some(date.and_time(parsed)))
            .map_err(|_| AppError::Validation(format!("time must be HH:MM, got '{t}'"))),
    }
}

/// Toggle today's attendance for an employee
#[utoipa::path(
    post,
    path = "/api/employees/{id}/toggle-attendance",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Resulting attendance record", body = AttendanceRecord),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn toggle_attendance(
    engine: web::Data<AppEngine>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let today = Local::now().date_naive();

    let record = engine.toggle(&employee_id, today).await?;
    tracing::info!(employee_id = %employee_id, status = %record.status, "Attendance toggled");
    Ok(HttpResponse::Ok().json(record))
}

/// Set attendance for a specific date (admin correction)
///
/// With only a status, the engine derives the times from it; with explicit
/// times, they are stored verbatim and the status defaults from them.
#[utoipa::path(
    post,
    path = "/api/employees/{id}/attendance/set",
    params(
        ("id", Path, description = "Employee ID")
    ),
    request_body = SetAttendanceRequest,
    responses(
        (status = 200, description = "Resulting attendance record", body = AttendanceRecord),
        (status = 400, description = "Malformed date or time"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn set_attendance(
    engine: web::Data<AppEngine>,
    path: web::Path<String>,
    payload: web::Json<SetAttendanceRequest>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let payload = payload.into_inner();

    let date = parse_date(&payload.date)?;
    let checkin_time = parse_time_on(date, payload.checkin_time.as_deref())?;
    let checkout_time = parse_time_on(date, payload.checkout_time.as_deref())?;

    let record = match (checkin_time, checkout_time, payload.status) {
        // Status-only requests derive their timestamps from the clock.
        (None, None, Some(status)) => engine.set_status(&employee_id, date, status).await?,
        _ => {
            engine
                .set_explicit_times(&employee_id, date, checkin_time, checkout_time, payload.status)
                .await?
        }
    };

    tracing::info!(employee_id = %employee_id, date = %date, status = %record.status, "Attendance set");
    Ok(HttpResponse::Ok().json(record))
}

/// Bulk attendance update
///
/// Items are applied independently in order; there is no batch atomicity.
/// The first failing item aborts the rest, already-applied items stay.
#[utoipa::path(
    post,
    path = "/api/attendance/bulk-update",
    request_body = BulkUpdateRequest,
    responses(
        (status = 200, description = "Number of applied changes", body = Object, example = json!({
            "success": true,
            "updated": 3
        })),
        (status = 400, description = "Malformed change descriptor"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn bulk_update(
    engine: web::Data<AppEngine>,
    payload: web::Json<BulkUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let changes = payload.into_inner().changes;
    let mut updated = 0usize;

    for change in changes {
        let date = parse_date(&change.date)?;
        let checkin_time = parse_time_on(date, change.checkin_time.as_deref())?;
        let checkout_time = parse_time_on(date, change.checkout_time.as_deref())?;

        engine
            .set_explicit_times(
                &change.employee_id,
                date,
                checkin_time,
                checkout_time,
                change.status,
            )
            .await?;
        updated += 1;
    }

    tracing::info!(updated, "Bulk attendance update applied");
    Ok(HttpResponse::Ok().json(json!({ "success": true, "updated": updated })))
}

/// Attendance history for an employee, most recent first
#[utoipa::path(
    get,
    path = "/api/employees/{id}/attendance/history",
    params(
        ("id", Path, description = "Employee ID"),
        ("limit", Query, description = "Maximum records to return, default 30")
    ),
    responses(
        (status = 200, description = "Attendance history", body = [AttendanceRecord]),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn attendance_history(
    engine: web::Data<AppEngine>,
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    engine.require_employee(&employee_id).await?;

    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let history = engine.store().list_attendance(&employee_id, limit).await?;
    Ok(HttpResponse::Ok().json(history))
}
