//! Record store contract consumed by the reconciliation engine and the
//! aggregation service. The store is deliberately dumb: point lookups,
//! inserts and partial updates. Upsert-by-key is the engine's job.

pub mod memory;
pub mod mysql;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::department::Department;
use crate::model::employee::{Employee, EmployeeWithAttendance};

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub department: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Partial employee update; only present fields are written.
#[derive(Debug, Default, Clone)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub employee_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub checkin_time: Option<NaiveDateTime>,
    pub checkout_time: Option<NaiveDateTime>,
}

/// Partial attendance update. The outer `Option` marks presence, the inner
/// one nullability: `Some(None)` clears the column, `None` leaves it alone.
#[derive(Debug, Default, Clone)]
pub struct AttendanceUpdate {
    pub status: Option<AttendanceStatus>,
    pub checkin_time: Option<Option<NaiveDateTime>>,
    pub checkout_time: Option<Option<NaiveDateTime>>,
}

#[allow(async_fn_in_trait)]
pub trait RecordStore {
    async fn find_employee(&self, id: &str) -> Result<Option<Employee>, AppError>;
    async fn list_employees(&self) -> Result<Vec<Employee>, AppError>;
    async fn create_employee(&self, new: NewEmployee) -> Result<Employee, AppError>;
    async fn update_employee(
        &self,
        id: &str,
        update: EmployeeUpdate,
    ) -> Result<Option<Employee>, AppError>;

    async fn list_departments(&self) -> Result<Vec<Department>, AppError>;
    async fn create_department(&self, name: &str) -> Result<Department, AppError>;

    async fn find_attendance(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError>;
    async fn insert_attendance(&self, new: NewAttendance) -> Result<AttendanceRecord, AppError>;
    async fn update_attendance(
        &self,
        id: &str,
        update: AttendanceUpdate,
    ) -> Result<AttendanceRecord, AppError>;
    /// History for one employee, most recent date first.
    async fn list_attendance(
        &self,
        employee_id: &str,
        limit: u32,
    ) -> Result<Vec<AttendanceRecord>, AppError>;

    /// Left join: one row per employee, attendance fields empty when the
    /// employee has no record for `date`.
    async fn employees_with_attendance(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<EmployeeWithAttendance>, AppError>;
}
