//! Aggregation over stored records: fleet-wide daily counts and
//! per-employee history statistics. Reads are point-in-time snapshots with
//! no isolation against concurrent engine writes.

use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::store::RecordStore;

/// How many records per employee the history stats look back over.
pub const STATS_LOOKBACK: u32 = 1000;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub total: usize,
    pub working: usize,
    pub checked_out: usize,
    pub not_checked_in: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeHistoryStats {
    pub total_days: usize,
    pub working_days: usize,
    pub absent_days: usize,
    pub average_working_hours: f64,
    pub this_week_working_days: usize,
    pub this_month_working_days: usize,
}

fn is_working_day(record: &AttendanceRecord) -> bool {
    matches!(
        record.status,
        AttendanceStatus::Working | AttendanceStatus::CheckedOut
    )
}

/// Fleet-wide counts for one date. Employees without a record for the date
/// count as not-checked-in, so the three buckets always partition `total`.
pub async fn daily_stats<S: RecordStore>(
    store: &S,
    date: NaiveDate,
) -> Result<DailyStats, AppError> {
    let rows = store.employees_with_attendance(date).await?;

    let mut stats = DailyStats {
        total: rows.len(),
        working: 0,
        checked_out: 0,
        not_checked_in: 0,
    };
    for row in &rows {
        match row.status {
            AttendanceStatus::Working => stats.working += 1,
            AttendanceStatus::CheckedOut => stats.checked_out += 1,
            AttendanceStatus::NotCheckedIn => stats.not_checked_in += 1,
        }
    }
    Ok(stats)
}

/// Historical statistics for one employee over the last `lookback` records.
/// Average hours are computed over records carrying both times; a malformed
/// record with checkout before checkin contributes negatively on purpose.
/// An empty history is a valid zero-valued result.
pub async fn employee_history_stats<S: RecordStore>(
    store: &S,
    employee_id: &str,
    lookback: u32,
) -> Result<EmployeeHistoryStats, AppError> {
    store
        .find_employee(employee_id)
        .await?
        .ok_or(AppError::NotFound("Employee"))?;

    let history = store.list_attendance(employee_id, lookback).await?;

    let total_days = history.len();
    let working_days = history.iter().filter(|r| is_working_day(r)).count();

    let durations: Vec<f64> = history
        .iter()
        .filter_map(|r| match (r.checkin_time, r.checkout_time) {
            (Some(checkin), Some(checkout)) => {
                Some((checkout - checkin).num_seconds() as f64 / 3600.0)
            }
            _ => None,
        })
        .collect();
    let average_working_hours = if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<f64>() / durations.len() as f64
    };

    // Windows compare by calendar date, not by instant.
    let today = Local::now().date_naive();
    let week_ago = today - Duration::days(7);
    let month_ago = today - Duration::days(30);

    Ok(EmployeeHistoryStats {
        total_days,
        working_days,
        absent_days: total_days - working_days,
        average_working_hours,
        this_week_working_days: history
            .iter()
            .filter(|r| r.date >= week_ago && is_working_day(r))
            .count(),
        this_month_working_days: history
            .iter()
            .filter(|r| r.date >= month_ago && is_working_day(r))
            .count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReconciliationEngine;
    use crate::model::attendance::AttendanceStatus::NotCheckedIn;
    use crate::store::memory::MemStore;
    use crate::store::NewEmployee;
    use chrono::NaiveDateTime;

    async fn seed_employee(store: &MemStore, name: &str) -> String {
        store
            .create_employee(NewEmployee {
                name: name.to_string(),
                department: "営業部".to_string(),
                email: None,
                avatar: None,
            })
            .await
            .unwrap()
            .id
    }

    fn at(d: NaiveDate, hm: &str) -> NaiveDateTime {
        d.and_time(format!("{hm}:00").parse().unwrap())
    }

    #[actix_web::test]
    async fn daily_stats_partition_the_employee_set() {
        let store = MemStore::new();
        let engine = ReconciliationEngine::new(store.clone());
        let d = Local::now().date_naive();

        let working = seed_employee(&store, "田中 太郎").await;
        let checked_out = seed_employee(&store, "佐藤 花子").await;
        let explicit_absent = seed_employee(&store, "高橋 次郎").await;
        seed_employee(&store, "山田 美咲").await; // no record at all

        engine.toggle(&working, d).await.unwrap();
        engine.toggle(&checked_out, d).await.unwrap();
        engine.toggle(&checked_out, d).await.unwrap();
        engine.set_status(&explicit_absent, d, NotCheckedIn).await.unwrap();

        let stats = daily_stats(&store, d).await.unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.working, 1);
        assert_eq!(stats.checked_out, 1);
        assert_eq!(stats.not_checked_in, 2);
        assert_eq!(
            stats.working + stats.checked_out + stats.not_checked_in,
            stats.total
        );
    }

    #[actix_web::test]
    async fn daily_stats_with_no_employees_is_all_zero() {
        let store = MemStore::new();
        let stats = daily_stats(&store, Local::now().date_naive()).await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.not_checked_in, 0);
    }

    #[actix_web::test]
    async fn empty_history_yields_zeroed_stats() {
        let store = MemStore::new();
        let emp = seed_employee(&store, "小林 健一").await;

        let stats = employee_history_stats(&store, &emp, STATS_LOOKBACK).await.unwrap();
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.working_days, 0);
        assert_eq!(stats.absent_days, 0);
        assert_eq!(stats.average_working_hours, 0.0);
    }

    #[actix_web::test]
    async fn history_stats_average_and_windows() {
        let store = MemStore::new();
        let engine = ReconciliationEngine::new(store.clone());
        let emp = seed_employee(&store, "鈴木 由美").await;
        let today = Local::now().date_naive();

        // 9h and 6h completed days inside the week window.
        let d1 = today - Duration::days(1);
        engine
            .set_explicit_times(&emp, d1, Some(at(d1, "09:00")), Some(at(d1, "18:00")), None)
            .await
            .unwrap();
        let d2 = today - Duration::days(2);
        engine
            .set_explicit_times(&emp, d2, Some(at(d2, "10:00")), Some(at(d2, "16:00")), None)
            .await
            .unwrap();
        // Working day without checkout: counts as working, not in the average.
        let d3 = today - Duration::days(3);
        engine
            .set_explicit_times(&emp, d3, Some(at(d3, "09:30")), None, None)
            .await
            .unwrap();
        // Explicit absence.
        let d4 = today - Duration::days(4);
        engine.set_status(&emp, d4, NotCheckedIn).await.unwrap();
        // Inside the month window only.
        let d5 = today - Duration::days(10);
        engine
            .set_explicit_times(&emp, d5, Some(at(d5, "09:00")), Some(at(d5, "17:00")), None)
            .await
            .unwrap();
        // Older than both windows.
        let d6 = today - Duration::days(40);
        engine
            .set_explicit_times(&emp, d6, Some(at(d6, "09:00")), Some(at(d6, "17:00")), None)
            .await
            .unwrap();

        let stats = employee_history_stats(&store, &emp, STATS_LOOKBACK).await.unwrap();
        assert_eq!(stats.total_days, 6);
        assert_eq!(stats.working_days, 5);
        assert_eq!(stats.absent_days, 1);
        // (9 + 6 + 8 + 8) / 4
        assert!((stats.average_working_hours - 7.75).abs() < 1e-9);
        assert_eq!(stats.this_week_working_days, 3);
        assert_eq!(stats.this_month_working_days, 4);
    }

    #[actix_web::test]
    async fn malformed_ordering_contributes_negative_hours() {
        let store = MemStore::new();
        let engine = ReconciliationEngine::new(store.clone());
        let emp = seed_employee(&store, "伊藤 雄介").await;
        let d = Local::now().date_naive();

        engine
            .set_explicit_times(&emp, d, Some(at(d, "18:00")), Some(at(d, "09:00")), None)
            .await
            .unwrap();

        let stats = employee_history_stats(&store, &emp, STATS_LOOKBACK).await.unwrap();
        assert!((stats.average_working_hours + 9.0).abs() < 1e-9);
    }

    #[actix_web::test]
    async fn history_stats_unknown_employee_is_not_found() {
        let store = MemStore::new();
        let err = employee_history_stats(&store, "no-such-id", STATS_LOOKBACK)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Employee")));
    }

    #[actix_web::test]
    async fn lookback_limits_the_history_considered() {
        let store = MemStore::new();
        let engine = ReconciliationEngine::new(store.clone());
        let emp = seed_employee(&store, "渡辺 恵子").await;
        let today = Local::now().date_naive();

        for days_ago in 1..=5 {
            let d = today - Duration::days(days_ago);
            engine
                .set_explicit_times(&emp, d, Some(at(d, "09:00")), Some(at(d, "17:00")), None)
                .await
                .unwrap();
        }

        let stats = employee_history_stats(&store, &emp, 3).await.unwrap();
        assert_eq!(stats.total_days, 3);
        assert_eq!(stats.working_days, 3);
    }
}
