use crate::api::attendance::{BulkChange, BulkUpdateRequest, SetAttendanceRequest};
use crate::api::department::CreateDepartment;
use crate::api::employee::{CreateEmployee, UpdateEmployee};
use crate::metrics::{ApiMetric, ApiStats, DbMetric, DbStats};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::department::Department;
use crate::model::employee::{Employee, EmployeeWithAttendance};
use crate::stats::{DailyStats, EmployeeHistoryStats};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kintai Attendance API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Tracker

This API powers a small attendance board: employees toggle their
check-in/check-out state for the day, administrators correct historical
records and manage employees and departments.

### 🔹 Key Features
- **Attendance**
  - One-tap toggle through not-checked-in → working → checked-out
  - Admin corrections by explicit times, single or in bulk
- **Statistics**
  - Fleet-wide daily counts and per-employee history stats
- **Performance**
  - In-process API/DB timing buffers with windowed aggregates

### 📦 Response Format
- JSON-based RESTful responses, camelCase field names

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,

        crate::api::attendance::toggle_attendance,
        crate::api::attendance::set_attendance,
        crate::api::attendance::bulk_update,
        crate::api::attendance::attendance_history,

        crate::api::stats::daily_stats,
        crate::api::stats::employee_stats,

        crate::api::department::list_departments,
        crate::api::department::create_department,

        crate::api::performance::performance_stats,
        crate::api::performance::recent_metrics
    ),
    components(
        schemas(
            Employee,
            EmployeeWithAttendance,
            CreateEmployee,
            UpdateEmployee,
            Department,
            CreateDepartment,
            AttendanceStatus,
            AttendanceRecord,
            SetAttendanceRequest,
            BulkChange,
            BulkUpdateRequest,
            DailyStats,
            EmployeeHistoryStats,
            ApiMetric,
            DbMetric,
            ApiStats,
            DbStats
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance toggling and corrections"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Department", description = "Department management APIs"),
        (name = "Stats", description = "Attendance statistics"),
        (name = "Performance", description = "In-process performance metrics"),
    )
)]
pub struct ApiDoc;
