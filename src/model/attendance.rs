use crate::model::user::UserSummary;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 31)]
    pub id: u64,
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = "2026-01-05T08:01:12Z", format = "date-time", value_type = String)]
    pub check_in_at: DateTime<Utc>,
    #[schema(example = "2026-01-05T16:03:40Z", format = "date-time", value_type = Option<String>)]
    pub check_out_at: Option<DateTime<Utc>>,
    #[schema(example = "remote today")]
    pub notes: Option<String>,
    #[schema(example = "2026-01-05T08:01:12Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(example = "2026-01-05T16:03:40Z", format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// Where a user stands in the check-in/check-out cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
pub enum AttendanceState {
    #[display(fmt = "idle")]
    Idle,
    #[display(fmt = "checked_in")]
    CheckedIn,
}

impl Attendance {
    pub fn is_open(&self) -> bool {
        self.check_out_at.is_none()
    }

    /// State implied by a user's most recent record, if any.
    pub fn state_of(last: Option<&Attendance>) -> AttendanceState {
        match last {
            Some(att) if att.is_open() => AttendanceState::CheckedIn,
            _ => AttendanceState::Idle,
        }
    }
}

/// Row shape of `attendances JOIN users`.
#[derive(sqlx::FromRow)]
pub struct AttendanceReportRow {
    #[sqlx(flatten)]
    pub attendance: Attendance,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<AttendanceReportRow> for Attendance {
    fn from(row: AttendanceReportRow) -> Self {
        let mut attendance = row.attendance;
        attendance.user = Some(UserSummary {
            id: attendance.user_id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
        });
        attendance
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckInReceipt {
    #[schema(example = 31)]
    pub attendance_id: u64,
    #[schema(example = "2026-01-05T08:01:12Z", format = "date-time", value_type = String)]
    pub check_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckOutReceipt {
    #[schema(example = 31)]
    pub attendance_id: u64,
    #[schema(example = "2026-01-05T16:03:40Z", format = "date-time", value_type = String)]
    pub check_out_at: DateTime<Utc>,
}
