use crate::model::{shift::ShiftSummary, user::UserSummary};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One shift assigned to one user on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Schedule {
    #[schema(example = 12)]
    pub id: u64,
    #[schema(example = 7)]
    pub user_id: u64,
    #[schema(example = 1)]
    pub shift_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "2026-01-01T08:00:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    pub shift: Option<ShiftSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub user_id: u64,
    pub shift_id: u64,
    pub date: NaiveDate,
}

/// Row shape of `user_schedules JOIN shifts`.
#[derive(sqlx::FromRow)]
pub struct ScheduleRow {
    pub id: u64,
    pub user_id: u64,
    pub shift_id: u64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub shift_name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl From<ScheduleRow> for Schedule {
    fn from(row: ScheduleRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            shift_id: row.shift_id,
            date: row.date,
            created_at: row.created_at,
            shift: Some(ShiftSummary {
                id: row.shift_id,
                name: row.shift_name,
                start_time: row.start_time,
                end_time: row.end_time,
            }),
            user: None,
        }
    }
}

/// Row shape of `user_schedules JOIN shifts JOIN users`.
#[derive(sqlx::FromRow)]
pub struct ScheduleReportRow {
    #[sqlx(flatten)]
    pub schedule: ScheduleRow,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<ScheduleReportRow> for Schedule {
    fn from(row: ScheduleReportRow) -> Self {
        let user = UserSummary {
            id: row.schedule.user_id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
        };
        let mut schedule = Schedule::from(row.schedule);
        schedule.user = Some(user);
        schedule
    }
}
