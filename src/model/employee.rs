use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

pub const DEFAULT_AVATAR: &str = "👤";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "2f6c0a4e-8a41-4a3e-9c2c-0a5c9c7c1d2e",
        "name": "田中 太郎",
        "department": "営業部",
        "email": "tanaka@example.com",
        "avatar": "👤"
    })
)]
pub struct Employee {
    pub id: String,

    #[schema(example = "田中 太郎")]
    pub name: String,

    /// Denormalized copy of the department label at assignment time.
    /// Renaming a department does not cascade here.
    #[schema(example = "営業部")]
    pub department: String,

    #[schema(example = "tanaka@example.com", nullable = true)]
    pub email: Option<String>,

    #[schema(example = "👤", nullable = true)]
    pub avatar: Option<String>,
}

/// One row per employee on the daily board; `today_record` is absent when
/// the employee has no attendance row for the day, in which case `status`
/// reads `not-checked-in`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeWithAttendance {
    #[serde(flatten)]
    pub employee: Employee,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today_record: Option<AttendanceRecord>,
    pub status: AttendanceStatus,
}
