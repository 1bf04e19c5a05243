use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::department::Department;
use crate::model::employee::{DEFAULT_AVATAR, Employee, EmployeeWithAttendance};
use crate::store::{
    AttendanceUpdate, EmployeeUpdate, NewAttendance, NewEmployee, RecordStore,
};

#[derive(Default)]
struct Inner {
    employees: Vec<Employee>,
    departments: Vec<Department>,
    attendance: Vec<AttendanceRecord>,
}

/// In-memory store with the same semantics as the MySQL one. Counts
/// attendance writes so tests can assert the engine's zero-write no-op paths.
#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<Mutex<Inner>>,
    attendance_writes: Arc<AtomicU64>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total attendance inserts + updates performed so far.
    pub fn attendance_writes(&self) -> u64 {
        self.attendance_writes.load(Ordering::SeqCst)
    }
}

impl RecordStore for MemStore {
    async fn find_employee(&self, id: &str) -> Result<Option<Employee>, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.employees.clone())
    }

    async fn create_employee(&self, new: NewEmployee) -> Result<Employee, AppError> {
        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            department: new.department,
            email: new.email,
            avatar: Some(new.avatar.unwrap_or_else(|| DEFAULT_AVATAR.to_string())),
        };
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.employees.push(employee.clone());
        Ok(employee)
    }

    async fn update_employee(
        &self,
        id: &str,
        update: EmployeeUpdate,
    ) -> Result<Option<Employee>, AppError> {
        if update.name.is_none()
            && update.department.is_none()
            && update.email.is_none()
            && update.avatar.is_none()
        {
            return Err(AppError::Validation("No fields provided for update".into()));
        }
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let Some(employee) = inner.employees.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            employee.name = name;
        }
        if let Some(department) = update.department {
            employee.department = department;
        }
        if let Some(email) = update.email {
            employee.email = Some(email);
        }
        if let Some(avatar) = update.avatar {
            employee.avatar = Some(avatar);
        }
        Ok(Some(employee.clone()))
    }

    async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut departments = inner.departments.clone();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    async fn create_department(&self, name: &str) -> Result<Department, AppError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        if inner.departments.iter().any(|d| d.name == name) {
            return Err(AppError::Validation(format!(
                "Department '{name}' already exists"
            )));
        }
        let department = Department {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Some(Local::now().naive_local()),
        };
        inner.departments.push(department.clone());
        Ok(department)
    }

    async fn find_attendance(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .attendance
            .iter()
            .find(|r| r.employee_id == employee_id && r.date == date)
            .cloned())
    }

    async fn insert_attendance(&self, new: NewAttendance) -> Result<AttendanceRecord, AppError> {
        let record = AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            employee_id: new.employee_id,
            date: new.date,
            status: new.status,
            checkin_time: new.checkin_time,
            checkout_time: new.checkout_time,
        };
        let mut inner = self.inner.lock().expect("store lock poisoned");
        inner.attendance.push(record.clone());
        self.attendance_writes.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }

    async fn update_attendance(
        &self,
        id: &str,
        update: AttendanceUpdate,
    ) -> Result<AttendanceRecord, AppError> {
        let mut inner = self.inner.lock().expect("store lock poisoned");
        let record = inner
            .attendance
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AppError::NotFound("Attendance record"))?;
        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(checkin_time) = update.checkin_time {
            record.checkin_time = checkin_time;
        }
        if let Some(checkout_time) = update.checkout_time {
            record.checkout_time = checkout_time;
        }
        self.attendance_writes.fetch_add(1, Ordering::SeqCst);
        Ok(record.clone())
    }

    async fn list_attendance(
        &self,
        employee_id: &str,
        limit: u32,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut history: Vec<AttendanceRecord> = inner
            .attendance
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.date.cmp(&a.date));
        history.truncate(limit as usize);
        Ok(history)
    }

    async fn employees_with_attendance(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<EmployeeWithAttendance>, AppError> {
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .employees
            .iter()
            .map(|employee| {
                let today_record = inner
                    .attendance
                    .iter()
                    .find(|r| r.employee_id == employee.id && r.date == date)
                    .cloned();
                let status = today_record
                    .as_ref()
                    .map(|r| r.status)
                    .unwrap_or(AttendanceStatus::NotCheckedIn);
                EmployeeWithAttendance {
                    employee: employee.clone(),
                    today_record,
                    status,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[actix_web::test]
    async fn partial_update_clears_only_present_fields() {
        let store = MemStore::new();
        let at = date("2024-06-01").and_hms_opt(9, 0, 0).unwrap();
        let record = store
            .insert_attendance(NewAttendance {
                employee_id: "emp-1".into(),
                date: date("2024-06-01"),
                status: AttendanceStatus::Working,
                checkin_time: Some(at),
                checkout_time: None,
            })
            .await
            .unwrap();

        // Outer None leaves checkin untouched, Some(None) clears checkout.
        let updated = store
            .update_attendance(
                &record.id,
                AttendanceUpdate {
                    status: Some(AttendanceStatus::NotCheckedIn),
                    checkin_time: Some(None),
                    checkout_time: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, AttendanceStatus::NotCheckedIn);
        assert_eq!(updated.checkin_time, None);
        assert_eq!(store.attendance_writes(), 2);
    }

    #[actix_web::test]
    async fn duplicate_department_name_is_rejected() {
        let store = MemStore::new();
        store.create_department("開発部").await.unwrap();
        let err = store.create_department("開発部").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[actix_web::test]
    async fn history_is_sorted_newest_first_and_limited() {
        let store = MemStore::new();
        for day in ["2024-06-01", "2024-06-03", "2024-06-02"] {
            store
                .insert_attendance(NewAttendance {
                    employee_id: "emp-1".into(),
                    date: date(day),
                    status: AttendanceStatus::Working,
                    checkin_time: None,
                    checkout_time: None,
                })
                .await
                .unwrap();
        }
        let history = store.list_attendance("emp-1", 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, date("2024-06-03"));
        assert_eq!(history[1].date, date("2024-06-02"));
    }
}
