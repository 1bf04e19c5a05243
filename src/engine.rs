//! Attendance status reconciliation. The engine is the single authority for
//! deriving a consistent (status, checkin, checkout) triple from an update
//! request and the previous record, and for deciding whether a write is
//! needed at all. Each operation is one read-then-write sequence with
//! last-write-wins semantics on concurrent callers.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;
use crate::store::{AttendanceUpdate, NewAttendance, RecordStore};

pub struct ReconciliationEngine<S> {
    store: S,
}

impl<S: RecordStore> ReconciliationEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    pub async fn require_employee(&self, id: &str) -> Result<Employee, AppError> {
        self.store
            .find_employee(id)
            .await?
            .ok_or(AppError::NotFound("Employee"))
    }

    /// Quick-toggle state machine for one day:
    /// not-checked-in → working → checked-out, with checked-out terminal.
    pub async fn toggle(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<AttendanceRecord, AppError> {
        self.require_employee(employee_id).await?;
        let now = Self::now();

        match self.store.find_attendance(employee_id, date).await? {
            None => {
                self.store
                    .insert_attendance(NewAttendance {
                        employee_id: employee_id.to_string(),
                        date,
                        status: AttendanceStatus::Working,
                        checkin_time: Some(now),
                        checkout_time: None,
                    })
                    .await
            }
            Some(record) => match record.status {
                // An explicit not-checked-in row is the same state as no row.
                AttendanceStatus::NotCheckedIn => {
                    self.store
                        .update_attendance(
                            &record.id,
                            AttendanceUpdate {
                                status: Some(AttendanceStatus::Working),
                                checkin_time: Some(Some(now)),
                                checkout_time: Some(None),
                            },
                        )
                        .await
                }
                AttendanceStatus::Working => {
                    self.store
                        .update_attendance(
                            &record.id,
                            AttendanceUpdate {
                                status: Some(AttendanceStatus::CheckedOut),
                                checkout_time: Some(Some(now)),
                                ..Default::default()
                            },
                        )
                        .await
                }
                // Terminal for the day; nothing to write.
                AttendanceStatus::CheckedOut => Ok(record),
            },
        }
    }

    /// Sets the target status and derives the time fields from it:
    /// working preserves an existing check-in and clears the checkout,
    /// checked-out backfills a missing check-in and stamps the checkout,
    /// not-checked-in clears both.
    pub async fn set_status(
        &self,
        employee_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, AppError> {
        self.require_employee(employee_id).await?;
        let now = Self::now();

        match self.store.find_attendance(employee_id, date).await? {
            None => {
                self.store
                    .insert_attendance(NewAttendance {
                        employee_id: employee_id.to_string(),
                        date,
                        status,
                        checkin_time: (status != AttendanceStatus::NotCheckedIn).then_some(now),
                        checkout_time: (status == AttendanceStatus::CheckedOut).then_some(now),
                    })
                    .await
            }
            Some(record) => {
                let mut update = AttendanceUpdate {
                    status: Some(status),
                    ..Default::default()
                };
                match status {
                    AttendanceStatus::Working => {
                        if record.checkin_time.is_none() {
                            update.checkin_time = Some(Some(now));
                        }
                        update.checkout_time = Some(None);
                    }
                    AttendanceStatus::CheckedOut => {
                        if record.checkin_time.is_none() {
                            update.checkin_time = Some(Some(now));
                        }
                        update.checkout_time = Some(Some(now));
                    }
                    AttendanceStatus::NotCheckedIn => {
                        update.checkin_time = Some(None);
                        update.checkout_time = Some(None);
                    }
                }
                self.store.update_attendance(&record.id, update).await
            }
        }
    }

    /// Administrator correction path: stores the given wall-clock instants
    /// verbatim (`None` clears a column). Status defaults to checked-out
    /// when a checkout is present, else working when a check-in is present,
    /// else not-checked-in; an explicit status wins. Identical submissions
    /// perform zero writes.
    pub async fn set_explicit_times(
        &self,
        employee_id: &str,
        date: NaiveDate,
        checkin_time: Option<NaiveDateTime>,
        checkout_time: Option<NaiveDateTime>,
        status: Option<AttendanceStatus>,
    ) -> Result<AttendanceRecord, AppError> {
        self.require_employee(employee_id).await?;

        let resolved = status.unwrap_or(match (checkin_time, checkout_time) {
            (_, Some(_)) => AttendanceStatus::CheckedOut,
            (Some(_), None) => AttendanceStatus::Working,
            (None, None) => AttendanceStatus::NotCheckedIn,
        });

        match self.store.find_attendance(employee_id, date).await? {
            None => {
                if resolved == AttendanceStatus::NotCheckedIn
                    && checkin_time.is_none()
                    && checkout_time.is_none()
                {
                    // Absence of a row already says exactly this.
                    return Ok(AttendanceRecord::implicit(employee_id, date));
                }
                self.store
                    .insert_attendance(NewAttendance {
                        employee_id: employee_id.to_string(),
                        date,
                        status: resolved,
                        checkin_time,
                        checkout_time,
                    })
                    .await
            }
            Some(record) => {
                if record.status == resolved
                    && record.checkin_time == checkin_time
                    && record.checkout_time == checkout_time
                {
                    // Identical submission, zero writes.
                    return Ok(record);
                }
                let mut update = AttendanceUpdate::default();
                if record.status != resolved {
                    update.status = Some(resolved);
                }
                if record.checkin_time != checkin_time {
                    update.checkin_time = Some(checkin_time);
                }
                if record.checkout_time != checkout_time {
                    update.checkout_time = Some(checkout_time);
                }
                self.store.update_attendance(&record.id, update).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus::{CheckedOut, NotCheckedIn, Working};
    use crate::store::NewEmployee;
    use crate::store::memory::MemStore;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn at(d: NaiveDate, hm: &str) -> NaiveDateTime {
        d.and_time(format!("{hm}:00").parse().unwrap())
    }

    async fn engine_with_employee(name: &str) -> (ReconciliationEngine<MemStore>, String) {
        let store = MemStore::new();
        let employee = store
            .create_employee(NewEmployee {
                name: name.to_string(),
                department: "開発部".to_string(),
                email: None,
                avatar: None,
            })
            .await
            .unwrap();
        (ReconciliationEngine::new(store), employee.id)
    }

    #[actix_web::test]
    async fn toggle_checks_in_on_first_call() {
        let (engine, emp) = engine_with_employee("田中 太郎").await;
        let d = date("2024-06-03");

        let record = engine.toggle(&emp, d).await.unwrap();

        assert_eq!(record.status, Working);
        assert!(record.checkin_time.is_some());
        assert_eq!(record.checkout_time, None);
        assert_eq!(engine.store().attendance_writes(), 1);
    }

    #[actix_web::test]
    async fn toggle_sequence_checks_out_after_working() {
        let (engine, emp) = engine_with_employee("佐藤 花子").await;
        let d = date("2024-06-03");

        let first = engine.toggle(&emp, d).await.unwrap();
        let second = engine.toggle(&emp, d).await.unwrap();

        assert_eq!(second.status, CheckedOut);
        assert_eq!(second.checkin_time, first.checkin_time);
        assert!(second.checkout_time.unwrap() >= second.checkin_time.unwrap());
        assert_eq!(engine.store().attendance_writes(), 2);
    }

    #[actix_web::test]
    async fn toggle_is_noop_once_checked_out() {
        let (engine, emp) = engine_with_employee("高橋 次郎").await;
        let d = date("2024-06-03");

        engine.toggle(&emp, d).await.unwrap();
        let second = engine.toggle(&emp, d).await.unwrap();
        let third = engine.toggle(&emp, d).await.unwrap();

        assert_eq!(third, second);
        assert_eq!(engine.store().attendance_writes(), 2);
    }

    #[actix_web::test]
    async fn toggle_unknown_employee_is_not_found() {
        let (engine, _) = engine_with_employee("小林 健一").await;
        let err = engine.toggle("no-such-id", date("2024-06-03")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("Employee")));
        assert_eq!(engine.store().attendance_writes(), 0);
    }

    #[actix_web::test]
    async fn toggle_treats_explicit_not_checked_in_row_like_absent() {
        let (engine, emp) = engine_with_employee("鈴木 由美").await;
        let d = date("2024-06-03");
        engine.set_status(&emp, d, NotCheckedIn).await.unwrap();

        let record = engine.toggle(&emp, d).await.unwrap();

        assert_eq!(record.status, Working);
        assert!(record.checkin_time.is_some());
        assert_eq!(record.checkout_time, None);
    }

    #[actix_web::test]
    async fn set_status_not_checked_in_clears_times() {
        let (engine, emp) = engine_with_employee("伊藤 雄介").await;
        let d = date("2024-06-03");
        engine.toggle(&emp, d).await.unwrap();
        engine.toggle(&emp, d).await.unwrap();

        let record = engine.set_status(&emp, d, NotCheckedIn).await.unwrap();

        assert_eq!(record.status, NotCheckedIn);
        assert_eq!(record.checkin_time, None);
        assert_eq!(record.checkout_time, None);
    }

    #[actix_web::test]
    async fn set_status_working_preserves_checkin_and_clears_checkout() {
        let (engine, emp) = engine_with_employee("渡辺 恵子").await;
        let d = date("2024-06-03");
        engine
            .set_explicit_times(&emp, d, Some(at(d, "09:00")), Some(at(d, "18:00")), None)
            .await
            .unwrap();

        let record = engine.set_status(&emp, d, Working).await.unwrap();

        assert_eq!(record.status, Working);
        assert_eq!(record.checkin_time, Some(at(d, "09:00")));
        assert_eq!(record.checkout_time, None);
    }

    #[actix_web::test]
    async fn set_status_checked_out_backfills_missing_checkin() {
        let (engine, emp) = engine_with_employee("中村 大輔").await;
        let d = date("2024-06-03");

        let record = engine.set_status(&emp, d, CheckedOut).await.unwrap();

        assert_eq!(record.status, CheckedOut);
        assert!(record.checkin_time.is_some());
        assert!(record.checkout_time.is_some());
    }

    #[actix_web::test]
    async fn set_status_checked_out_keeps_existing_checkin() {
        let (engine, emp) = engine_with_employee("松本 裕子").await;
        let d = date("2024-06-03");
        let checked_in = engine.toggle(&emp, d).await.unwrap();

        let record = engine.set_status(&emp, d, CheckedOut).await.unwrap();

        assert_eq!(record.checkin_time, checked_in.checkin_time);
        assert!(record.checkout_time.is_some());
    }

    #[actix_web::test]
    async fn set_explicit_times_derives_checked_out_from_both_times() {
        let (engine, emp) = engine_with_employee("木村 隆司").await;
        let d = date("2024-06-01");

        let record = engine
            .set_explicit_times(&emp, d, Some(at(d, "09:00")), Some(at(d, "18:00")), None)
            .await
            .unwrap();

        assert_eq!(record.status, CheckedOut);
        assert_eq!(record.checkin_time, Some(at(d, "09:00")));
        assert_eq!(record.checkout_time, Some(at(d, "18:00")));
        assert_eq!(engine.store().attendance_writes(), 1);
    }

    #[actix_web::test]
    async fn identical_explicit_submission_writes_nothing() {
        let (engine, emp) = engine_with_employee("岡田 真理").await;
        let d = date("2024-06-01");
        let args = (Some(at(d, "09:00")), Some(at(d, "18:00")));

        let first = engine
            .set_explicit_times(&emp, d, args.0, args.1, None)
            .await
            .unwrap();
        let second = engine
            .set_explicit_times(&emp, d, args.0, args.1, None)
            .await
            .unwrap();

        assert_eq!(second, first);
        assert_eq!(engine.store().attendance_writes(), 1);
    }

    #[actix_web::test]
    async fn explicit_checkin_then_full_correction() {
        // 山田 has no record for 2024-06-01; a checkin-only correction makes
        // the day working, a follow-up with both times checks it out without
        // touching the original check-in.
        let (engine, emp) = engine_with_employee("山田 美咲").await;
        let d = date("2024-06-01");

        let first = engine
            .set_explicit_times(&emp, d, Some(at(d, "09:15")), None, None)
            .await
            .unwrap();
        assert_eq!(first.status, Working);
        assert_eq!(first.checkin_time, Some(at(d, "09:15")));
        assert_eq!(first.checkout_time, None);

        let second = engine
            .set_explicit_times(&emp, d, Some(at(d, "09:15")), Some(at(d, "18:30")), None)
            .await
            .unwrap();
        assert_eq!(second.status, CheckedOut);
        assert_eq!(second.checkin_time, Some(at(d, "09:15")));
        assert_eq!(second.checkout_time, Some(at(d, "18:30")));
    }

    #[actix_web::test]
    async fn explicit_status_wins_over_derivation() {
        let (engine, emp) = engine_with_employee("前田 健太").await;
        let d = date("2024-06-01");

        let record = engine
            .set_explicit_times(&emp, d, Some(at(d, "09:00")), Some(at(d, "18:00")), Some(Working))
            .await
            .unwrap();

        assert_eq!(record.status, Working);
    }

    #[actix_web::test]
    async fn all_default_correction_on_absent_row_creates_nothing() {
        let (engine, emp) = engine_with_employee("吉田 麻美").await;
        let d = date("2024-06-01");

        let record = engine
            .set_explicit_times(&emp, d, None, None, None)
            .await
            .unwrap();

        assert_eq!(record.status, NotCheckedIn);
        assert_eq!(record.checkin_time, None);
        assert_eq!(record.checkout_time, None);
        assert_eq!(engine.store().attendance_writes(), 0);
        assert!(engine.store().find_attendance(&emp, d).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn explicit_times_clear_omitted_fields() {
        let (engine, emp) = engine_with_employee("加藤 信一").await;
        let d = date("2024-06-01");
        engine
            .set_explicit_times(&emp, d, Some(at(d, "09:00")), Some(at(d, "18:00")), None)
            .await
            .unwrap();

        // Re-submitting with only a check-in reverts the day to working.
        let record = engine
            .set_explicit_times(&emp, d, Some(at(d, "09:15")), None, None)
            .await
            .unwrap();

        assert_eq!(record.status, Working);
        assert_eq!(record.checkin_time, Some(at(d, "09:15")));
        assert_eq!(record.checkout_time, None);
    }

    #[actix_web::test]
    async fn each_date_starts_fresh() {
        let (engine, emp) = engine_with_employee("斎藤 直子").await;
        engine.toggle(&emp, date("2024-06-03")).await.unwrap();
        engine.toggle(&emp, date("2024-06-03")).await.unwrap();

        let next_day = engine.toggle(&emp, date("2024-06-04")).await.unwrap();

        assert_eq!(next_day.status, Working);
        assert_eq!(next_day.checkout_time, None);
    }
}
