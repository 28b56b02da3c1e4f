use crate::{
    error::{AppError, StoreError},
    model::schedule::{NewSchedule, Schedule},
    models::ScheduleInput,
    repository::ScheduleRepository,
    utils::{
        date_range::{DateRange, parse_date},
        pagination::Pagination,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Schedule with ID {0} not found")]
    NotFound(u64),
    #[error("Invalid date format, use YYYY-MM-DD")]
    InvalidDate(String),
    #[error("User already has a schedule on this date")]
    DuplicateOnDate,
    #[error("Invalid User ID or Shift ID provided")]
    InvalidReference,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::NotFound(_) => AppError::NotFound(err.to_string()),
            ScheduleError::InvalidDate(ref value) => AppError::validation_with(err.to_string(), value),
            ScheduleError::DuplicateOnDate => AppError::Conflict(err.to_string()),
            ScheduleError::InvalidReference => AppError::validation(err.to_string()),
            ScheduleError::Store(e) => AppError::internal("Failed to process schedule request", e),
        }
    }
}

/// Assigns shifts to users, one per user per calendar day.
pub struct ScheduleAssignor {
    schedules: Arc<dyn ScheduleRepository>,
}

impl ScheduleAssignor {
    pub fn new(schedules: Arc<dyn ScheduleRepository>) -> Self {
        Self { schedules }
    }

    pub async fn create(&self, input: &ScheduleInput) -> Result<u64, ScheduleError> {
        let schedule = parse_schedule(input)?;
        let id = self.schedules.create(&schedule).await.map_err(classify)?;
        info!(
            schedule_id = id,
            user_id = schedule.user_id,
            shift_id = schedule.shift_id,
            date = %schedule.date,
            "Schedule created"
        );
        Ok(id)
    }

    pub async fn list_for_user(
        &self,
        user_id: u64,
        range: DateRange,
        pagination: Pagination,
    ) -> Result<(Vec<Schedule>, u64), ScheduleError> {
        Ok(self
            .schedules
            .list_for_user(user_id, range.start, range.end, pagination)
            .await?)
    }

    pub async fn list_all(&self, range: DateRange, pagination: Pagination) -> Result<(Vec<Schedule>, u64), ScheduleError> {
        Ok(self.schedules.list_all(range.start, range.end, pagination).await?)
    }

    pub async fn update(&self, id: u64, input: &ScheduleInput) -> Result<(), ScheduleError> {
        let schedule = parse_schedule(input)?;
        self.schedules.update(id, &schedule).await.map_err(|e| match e {
            StoreError::NotFound => ScheduleError::NotFound(id),
            other => classify(other),
        })?;
        info!(schedule_id = id, "Schedule updated");
        Ok(())
    }

    pub async fn delete(&self, id: u64) -> Result<(), ScheduleError> {
        self.schedules.delete(id).await.map_err(|e| match e {
            StoreError::NotFound => ScheduleError::NotFound(id),
            other => other.into(),
        })?;
        info!(schedule_id = id, "Schedule deleted");
        Ok(())
    }
}

fn classify(err: StoreError) -> ScheduleError {
    match err {
        StoreError::Duplicate => ScheduleError::DuplicateOnDate,
        StoreError::InvalidReference => ScheduleError::InvalidReference,
        other => ScheduleError::Store(other),
    }
}

fn parse_schedule(input: &ScheduleInput) -> Result<NewSchedule, ScheduleError> {
    if input.user_id == 0 || input.shift_id == 0 {
        return Err(ScheduleError::InvalidReference);
    }
    let date = parse_date(&input.date).ok_or_else(|| ScheduleError::InvalidDate(input.date.clone()))?;

    Ok(NewSchedule {
        user_id: input.user_id,
        shift_id: input.shift_id,
        date,
    })
}
