use crate::utils::response::ApiResponse;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Outcome of a data-access call that did not succeed. Constraint
/// violations are classified by kind so callers never inspect messages.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("unique constraint violated")]
    Duplicate,
    #[error("foreign key references a missing row")]
    InvalidReference,
    #[error("row is still referenced by dependent rows")]
    StillReferenced,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Classifies an error raised by an INSERT or UPDATE.
    pub fn from_write(err: sqlx::Error) -> Self {
        match constraint_kind(&err) {
            Some(ErrorKind::UniqueViolation) => Self::Duplicate,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            _ => Self::Database(err),
        }
    }

    /// Classifies an error raised by a DELETE.
    pub fn from_delete(err: sqlx::Error) -> Self {
        match constraint_kind(&err) {
            Some(ErrorKind::ForeignKeyViolation) => Self::StillReferenced,
            _ => Self::Database(err),
        }
    }
}

fn constraint_kind(err: &sqlx::Error) -> Option<ErrorKind> {
    match err {
        sqlx::Error::Database(db_err) => Some(db_err.kind()),
        _ => None,
    }
}

/// Error returned by HTTP handlers. Every variant renders as the standard
/// `{success, message, data?}` envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        message: String,
        detail: Option<String>,
    },
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    ReferentialConflict(String),
    #[error("{message}")]
    Internal { message: String, detail: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            detail: None,
        }
    }

    pub fn validation_with(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::Validation {
            message: message.into(),
            detail: Some(detail.to_string()),
        }
    }

    /// Logs the underlying failure and hides it behind a generic message.
    pub fn internal(message: impl Into<String>, err: impl std::fmt::Display) -> Self {
        let message = message.into();
        tracing::error!(error = %err, "{message}");
        Self::Internal {
            message,
            detail: err.to_string(),
        }
    }

    fn detail(&self) -> Option<&str> {
        match self {
            Self::Validation { detail, .. } => detail.as_deref(),
            Self::Internal { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::ReferentialConflict(_) => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = ApiResponse::failure(self.to_string(), self.detail().map(str::to_owned));
        HttpResponse::build(self.status_code()).json(body)
    }
}
