use crate::{
    error::{AppError, StoreError},
    model::shift::{NewShift, Shift, TIME_FORMAT},
    models::ShiftInput,
    repository::ShiftRepository,
};
use chrono::NaiveTime;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum ShiftError {
    #[error("Shift with ID {0} not found")]
    NotFound(u64),
    #[error("Invalid time format, use HH:MM:SS")]
    InvalidTimeFormat(String),
    #[error("{0}")]
    Validation(String),
    #[error("Shift is still referenced by user schedules")]
    StillScheduled,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ShiftError> for AppError {
    fn from(err: ShiftError) -> Self {
        match err {
            ShiftError::NotFound(_) => AppError::NotFound(err.to_string()),
            ShiftError::InvalidTimeFormat(ref value) => AppError::validation_with(err.to_string(), value),
            ShiftError::Validation(message) => AppError::validation(message),
            ShiftError::StillScheduled => AppError::ReferentialConflict(err.to_string()),
            ShiftError::Store(e) => AppError::internal("Failed to process shift request", e),
        }
    }
}

/// Named time-of-day windows that schedules point at.
pub struct ShiftCatalog {
    shifts: Arc<dyn ShiftRepository>,
}

impl ShiftCatalog {
    pub fn new(shifts: Arc<dyn ShiftRepository>) -> Self {
        Self { shifts }
    }

    pub async fn create(&self, input: &ShiftInput) -> Result<u64, ShiftError> {
        let shift = parse_shift(input)?;
        let id = self.shifts.create(&shift).await?;
        info!(shift_id = id, name = %shift.name, "Shift created");
        Ok(id)
    }

    pub async fn get(&self, id: u64) -> Result<Shift, ShiftError> {
        self.shifts.find_by_id(id).await?.ok_or(ShiftError::NotFound(id))
    }

    pub async fn list(&self) -> Result<Vec<Shift>, ShiftError> {
        Ok(self.shifts.list().await?)
    }

    pub async fn update(&self, id: u64, input: &ShiftInput) -> Result<(), ShiftError> {
        let shift = parse_shift(input)?;
        self.shifts.update(id, &shift).await.map_err(|e| match e {
            StoreError::NotFound => ShiftError::NotFound(id),
            other => other.into(),
        })?;
        info!(shift_id = id, "Shift updated");
        Ok(())
    }

    pub async fn delete(&self, id: u64) -> Result<(), ShiftError> {
        self.shifts.delete(id).await.map_err(|e| match e {
            StoreError::NotFound => ShiftError::NotFound(id),
            StoreError::StillReferenced => ShiftError::StillScheduled,
            other => other.into(),
        })?;
        info!(shift_id = id, "Shift deleted");
        Ok(())
    }
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, ShiftError> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT).map_err(|_| ShiftError::InvalidTimeFormat(raw.to_string()))
}

fn parse_shift(input: &ShiftInput) -> Result<NewShift, ShiftError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ShiftError::Validation("Shift name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ShiftError::Validation(format!(
            "Shift name must be at most {MAX_NAME_LEN} characters"
        )));
    }

    Ok(NewShift {
        name: name.to_string(),
        start_time: parse_time(&input.start_time)?,
        end_time: parse_time(&input.end_time)?,
    })
}
