use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Day-level attendance state. `checked-out` is terminal for toggling:
/// once an employee has checked out, further toggles on that date are no-ops.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    NotCheckedIn,
    Working,
    CheckedOut,
}

/// At most one row exists per (employee_id, date); the reconciliation engine
/// enforces that, not the database. A missing row means `not-checked-in`
/// with no times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,
    #[schema(example = "2024-06-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub checkin_time: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub checkout_time: Option<NaiveDateTime>,
}

impl AttendanceRecord {
    /// The record an absent row stands for. Never persisted; the empty id
    /// marks it as implicit.
    pub fn implicit(employee_id: &str, date: NaiveDate) -> Self {
        Self {
            id: String::new(),
            employee_id: employee_id.to_string(),
            date,
            status: AttendanceStatus::NotCheckedIn,
            checkin_time: None,
            checkout_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::CheckedOut).unwrap(),
            "\"checked-out\""
        );
        let parsed: AttendanceStatus = serde_json::from_str("\"not-checked-in\"").unwrap();
        assert_eq!(parsed, AttendanceStatus::NotCheckedIn);
    }

    #[test]
    fn status_display_matches_wire_format() {
        assert_eq!(AttendanceStatus::Working.to_string(), "working");
        assert_eq!(
            "checked-out".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::CheckedOut
        );
    }

    #[test]
    fn record_serializes_camel_case_with_null_times() {
        let record = AttendanceRecord::implicit("emp-1", "2024-06-01".parse().unwrap());
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["employeeId"], "emp-1");
        assert_eq!(json["status"], "not-checked-in");
        assert!(json["checkinTime"].is_null());
        assert!(json["checkoutTime"].is_null());
    }
}
