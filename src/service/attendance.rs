use crate::{
    error::{AppError, StoreError},
    model::attendance::{Attendance, AttendanceState, CheckInReceipt, CheckOutReceipt},
    repository::{AttendanceRepository, ScheduleRepository},
    utils::{date_range::DateRange, pagination::Pagination},
};
use chrono::{DateTime, Local, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("User already checked in")]
    AlreadyCheckedIn,
    #[error("No schedule found for today")]
    NoScheduleToday,
    #[error("No active check-in found to check out from")]
    NoOpenSession,
    #[error("User has already checked out for the last session")]
    AlreadyCheckedOut,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AttendanceError> for AppError {
    fn from(err: AttendanceError) -> Self {
        match err {
            AttendanceError::AlreadyCheckedIn | AttendanceError::AlreadyCheckedOut => {
                AppError::Conflict(err.to_string())
            }
            AttendanceError::NoScheduleToday => AppError::Forbidden(err.to_string()),
            AttendanceError::NoOpenSession => AppError::NotFound(err.to_string()),
            AttendanceError::Store(e) => AppError::internal("Failed to process attendance request", e),
        }
    }
}

/// Check-in/check-out state machine per user: Idle -> CheckedIn -> Idle.
pub struct AttendanceRecorder {
    attendance: Arc<dyn AttendanceRepository>,
    schedules: Arc<dyn ScheduleRepository>,
}

impl AttendanceRecorder {
    pub fn new(attendance: Arc<dyn AttendanceRepository>, schedules: Arc<dyn ScheduleRepository>) -> Self {
        Self { attendance, schedules }
    }

    pub async fn check_in(&self, user_id: u64, notes: Option<&str>) -> Result<CheckInReceipt, AttendanceError> {
        self.check_in_at(user_id, notes, Utc::now()).await
    }

    pub async fn check_out(&self, user_id: u64, notes: Option<&str>) -> Result<CheckOutReceipt, AttendanceError> {
        self.check_out_at(user_id, notes, Utc::now()).await
    }

    /// Checks in at `now`. Requires a schedule on the server-local date of `now`.
    pub async fn check_in_at(
        &self,
        user_id: u64,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CheckInReceipt, AttendanceError> {
        let last = self.last_for_user(user_id).await?;
        if Attendance::state_of(last.as_ref()) == AttendanceState::CheckedIn {
            warn!(user_id, "Check-in rejected: session still open");
            return Err(AttendanceError::AlreadyCheckedIn);
        }

        let today = now.with_timezone(&Local).date_naive();
        if self.schedules.find_for_user_on(user_id, today).await?.is_none() {
            warn!(user_id, %today, "Check-in rejected: no schedule today");
            return Err(AttendanceError::NoScheduleToday);
        }

        let attendance_id = self.attendance.create(user_id, now, clean_notes(notes)).await?;
        info!(user_id, attendance_id, "Checked in");

        Ok(CheckInReceipt {
            attendance_id,
            check_in_at: now,
        })
    }

    pub async fn check_out_at(
        &self,
        user_id: u64,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CheckOutReceipt, AttendanceError> {
        let last = self.last_for_user(user_id).await?.ok_or(AttendanceError::NoOpenSession)?;

        if Attendance::state_of(Some(&last)) == AttendanceState::Idle {
            return Err(AttendanceError::AlreadyCheckedOut);
        }

        // another request may have closed it since the read above
        if !self.attendance.close(last.id, now, clean_notes(notes)).await? {
            warn!(user_id, attendance_id = last.id, "Check-out lost the race to a concurrent request");
            return Err(AttendanceError::AlreadyCheckedOut);
        }
        info!(user_id, attendance_id = last.id, "Checked out");

        Ok(CheckOutReceipt {
            attendance_id: last.id,
            check_out_at: now,
        })
    }

    pub async fn last_for_user(&self, user_id: u64) -> Result<Option<Attendance>, AttendanceError> {
        Ok(self.attendance.last_for_user(user_id).await?)
    }

    pub async fn list_for_user(
        &self,
        user_id: u64,
        range: DateRange,
        pagination: Pagination,
    ) -> Result<(Vec<Attendance>, u64), AttendanceError> {
        let (from, to) = range.bounds_utc();
        Ok(self.attendance.list_for_user(user_id, from, to, pagination).await?)
    }

    pub async fn list_all(
        &self,
        range: DateRange,
        pagination: Pagination,
    ) -> Result<(Vec<Attendance>, u64), AttendanceError> {
        let (from, to) = range.bounds_utc();
        Ok(self.attendance.list_all(from, to, pagination).await?)
    }
}

fn clean_notes(notes: Option<&str>) -> Option<&str> {
    notes.map(str::trim).filter(|n| !n.is_empty())
}
