use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate, NaiveDateTime};
use sqlx::MySqlPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::metrics::PerformanceMonitor;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::department::Department;
use crate::model::employee::{DEFAULT_AVATAR, Employee, EmployeeWithAttendance};
use crate::store::{
    AttendanceUpdate, EmployeeUpdate, NewAttendance, NewEmployee, RecordStore,
};

/// MySQL-backed store. Every query is timed into the performance monitor.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
    monitor: Arc<PerformanceMonitor>,
}

/// Left-join row shape for the daily board query.
#[derive(sqlx::FromRow)]
struct JoinedRow {
    id: String,
    name: String,
    department: String,
    email: Option<String>,
    avatar: Option<String>,
    attendance_id: Option<String>,
    attendance_status: Option<AttendanceStatus>,
    checkin_time: Option<NaiveDateTime>,
    checkout_time: Option<NaiveDateTime>,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool, monitor: Arc<PerformanceMonitor>) -> Self {
        Self { pool, monitor }
    }

    /// Records the query timing and maps the error, logging details here so
    /// callers only see the generic store failure.
    fn finish<T>(
        &self,
        query: &str,
        started: Instant,
        result: Result<T, sqlx::Error>,
    ) -> Result<T, AppError> {
        self.monitor
            .record_db(query, started.elapsed().as_millis() as u64, result.is_ok());
        result.map_err(|e| {
            tracing::error!(error = %e, query, "Query failed");
            AppError::Store(e)
        })
    }
}

impl RecordStore for MySqlStore {
    async fn find_employee(&self, id: &str) -> Result<Option<Employee>, AppError> {
        let sql = "SELECT id, name, department, email, avatar FROM employees WHERE id = ?";
        let started = Instant::now();
        let result = sqlx::query_as::<_, Employee>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        self.finish(sql, started, result)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, AppError> {
        let sql = "SELECT id, name, department, email, avatar FROM employees";
        let started = Instant::now();
        let result = sqlx::query_as::<_, Employee>(sql).fetch_all(&self.pool).await;
        self.finish(sql, started, result)
    }

    async fn create_employee(&self, new: NewEmployee) -> Result<Employee, AppError> {
        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            department: new.department,
            email: new.email,
            avatar: Some(new.avatar.unwrap_or_else(|| DEFAULT_AVATAR.to_string())),
        };

        let sql = "INSERT INTO employees (id, name, department, email, avatar) VALUES (?, ?, ?, ?, ?)";
        let started = Instant::now();
        let result = sqlx::query(sql)
            .bind(&employee.id)
            .bind(&employee.name)
            .bind(&employee.department)
            .bind(&employee.email)
            .bind(&employee.avatar)
            .execute(&self.pool)
            .await;
        self.finish(sql, started, result)?;

        Ok(employee)
    }

    async fn update_employee(
        &self,
        id: &str,
        update: EmployeeUpdate,
    ) -> Result<Option<Employee>, AppError> {
        // Build the SET clause dynamically from the provided fields.
        let mut sets = Vec::new();
        let mut bindings: Vec<String> = Vec::new();

        if let Some(name) = update.name {
            sets.push("name = ?");
            bindings.push(name);
        }
        if let Some(department) = update.department {
            sets.push("department = ?");
            bindings.push(department);
        }
        if let Some(email) = update.email {
            sets.push("email = ?");
            bindings.push(email);
        }
        if let Some(avatar) = update.avatar {
            sets.push("avatar = ?");
            bindings.push(avatar);
        }

        if sets.is_empty() {
            return Err(AppError::Validation("No fields provided for update".into()));
        }

        let sql = format!("UPDATE employees SET {} WHERE id = ?", sets.join(", "));
        let started = Instant::now();
        let mut query = sqlx::query(&sql);
        for b in &bindings {
            query = query.bind(b);
        }
        let result = query.bind(id).execute(&self.pool).await;
        self.finish(&sql, started, result)?;

        // rows_affected is 0 both for a missing row and for an identical
        // value write, so re-read to tell the two apart.
        self.find_employee(id).await
    }

    async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        let sql = "SELECT id, name, created_at FROM departments ORDER BY name";
        let started = Instant::now();
        let result = sqlx::query_as::<_, Department>(sql).fetch_all(&self.pool).await;
        self.finish(sql, started, result)
    }

    async fn create_department(&self, name: &str) -> Result<Department, AppError> {
        let department = Department {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Some(Local::now().naive_local()),
        };

        let sql = "INSERT INTO departments (id, name, created_at) VALUES (?, ?, ?)";
        let started = Instant::now();
        let result = sqlx::query(sql)
            .bind(&department.id)
            .bind(&department.name)
            .bind(department.created_at)
            .execute(&self.pool)
            .await;
        self.monitor
            .record_db(sql, started.elapsed().as_millis() as u64, result.is_ok());

        match result {
            Ok(_) => Ok(department),
            Err(e) => {
                // Duplicate department name
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.code().as_deref() == Some("23000") {
                        return Err(AppError::Validation(format!(
                            "Department '{name}' already exists"
                        )));
                    }
                }
                tracing::error!(error = %e, name, "Failed to create department");
                Err(AppError::Store(e))
            }
        }
    }

    async fn find_attendance(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        let sql = "SELECT id, employee_id, date, status, checkin_time, checkout_time \
                   FROM attendance_records WHERE employee_id = ? AND date = ?";
        let started = Instant::now();
        let result = sqlx::query_as::<_, AttendanceRecord>(sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await;
        self.finish(sql, started, result)
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

        let sql = "INSERT INTO attendance_records \
                   (id, employee_id, date, status, checkin_time, checkout_time) \
                   VALUES (?, ?, ?, ?, ?, ?)";
        let started = Instant::now();
        let result = sqlx::query(sql)
            .bind(&record.id)
            .bind(&record.employee_id)
            .bind(record.date)
            .bind(record.status)
            .bind(record.checkin_time)
            .bind(record.checkout_time)
            .execute(&self.pool)
            .await;
        self.finish(sql, started, result)?;

        Ok(record)
    }

    async fn update_attendance(
        &self,
        id: &str,
        update: AttendanceUpdate,
    ) -> Result<AttendanceRecord, AppError> {
        let mut sets = Vec::new();
        if update.status.is_some() {
            sets.push("status = ?");
        }
        if update.checkin_time.is_some() {
            sets.push("checkin_time = ?");
        }
        if update.checkout_time.is_some() {
            sets.push("checkout_time = ?");
        }

        if !sets.is_empty() {
            let sql = format!(
                "UPDATE attendance_records SET {} WHERE id = ?",
                sets.join(", ")
            );
            let started = Instant::now();
            let mut query = sqlx::query(&sql);
            if let Some(status) = update.status {
                query = query.bind(status);
            }
            if let Some(checkin_time) = update.checkin_time {
                query = query.bind(checkin_time);
            }
            if let Some(checkout_time) = update.checkout_time {
                query = query.bind(checkout_time);
            }
            let result = query.bind(id).execute(&self.pool).await;
            self.finish(&sql, started, result)?;
        }

        let sql = "SELECT id, employee_id, date, status, checkin_time, checkout_time \
                   FROM attendance_records WHERE id = ?";
        let started = Instant::now();
        let result = sqlx::query_as::<_, AttendanceRecord>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        self.finish(sql, started, result)?
            .ok_or(AppError::NotFound("Attendance record"))
    }

    async fn list_attendance(
        &self,
        employee_id: &str,
        limit: u32,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let sql = "SELECT id, employee_id, date, status, checkin_time, checkout_time \
                   FROM attendance_records WHERE employee_id = ? ORDER BY date DESC LIMIT ?";
        let started = Instant::now();
        let result = sqlx::query_as::<_, AttendanceRecord>(sql)
            .bind(employee_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await;
        self.finish(sql, started, result)
    }

    async fn employees_with_attendance(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<EmployeeWithAttendance>, AppError> {
        let sql = "SELECT e.id, e.name, e.department, e.email, e.avatar, \
                          a.id AS attendance_id, a.status AS attendance_status, \
                          a.checkin_time, a.checkout_time \
                   FROM employees e \
                   LEFT JOIN attendance_records a \
                     ON a.employee_id = e.id AND a.date = ?";
        let started = Instant::now();
        let result = sqlx::query_as::<_, JoinedRow>(sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await;
        let rows = self.finish(sql, started, result)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let status = row.attendance_status.unwrap_or(AttendanceStatus::NotCheckedIn);
                let today_record = row.attendance_id.map(|attendance_id| AttendanceRecord {
                    id: attendance_id,
                    employee_id: row.id.clone(),
                    date,
                    status,
                    checkin_time: row.checkin_time,
                    checkout_time: row.checkout_time,
                });
                EmployeeWithAttendance {
                    employee: Employee {
                        id: row.id,
                        name: row.name,
                        department: row.department,
                        email: row.email,
                        avatar: row.avatar.or_else(|| Some(DEFAULT_AVATAR.to_string())),
                    },
                    today_record,
                    status,
                }
            })
            .collect())
    }
}
