use crate::{error::AppError, model::schedule::DATE_FORMAT};
use chrono::{DateTime, Datelike, Local, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::warn;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DateRangeQuery {
    /// First day to include (YYYY-MM-DD), defaults to the start of the current month
    pub start_date: Option<String>,
    /// Last day to include (YYYY-MM-DD)
    pub end_date: Option<String>,
}

/// Default upper bound used when `end_date` is missing or malformed.
#[derive(Debug, Copy, Clone)]
pub enum RangeEnd {
    Today,
    EndOfMonth,
}

/// Inclusive range of calendar days.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The server's current calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if end < start {
            warn!(%start, %end, "Invalid date range");
            return Err(AppError::validation("end_date cannot be before start_date"));
        }
        Ok(Self { start, end })
    }

    pub fn from_query(query: &DateRangeQuery, default_end: RangeEnd, today: NaiveDate) -> Result<Self, AppError> {
        let start_of_month = today.with_day(1).unwrap_or(today);
        let end = match default_end {
            RangeEnd::Today => today,
            RangeEnd::EndOfMonth => start_of_month
                .checked_add_months(Months::new(1))
                .and_then(|d| d.pred_opt())
                .unwrap_or(today),
        };

        let start = date_param("start_date", query.start_date.as_deref(), start_of_month);
        let end = date_param("end_date", query.end_date.as_deref(), end);
        Self::new(start, end)
    }

    /// UTC instants covering the whole range in server local time, from the
    /// first microsecond of `start` to the last microsecond of `end`.
    pub fn bounds_utc(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let first = self.start.and_hms_opt(0, 0, 0).unwrap_or_default();
        let last = self
            .end
            .and_hms_micro_opt(23, 59, 59, 999_999)
            .unwrap_or_default();

        (local_to_utc(first, true), local_to_utc(last, false))
    }
}

fn date_param(name: &str, raw: Option<&str>, default: NaiveDate) -> NaiveDate {
    match raw.map(str::trim) {
        None | Some("") => default,
        Some(value) => parse_date(value).unwrap_or_else(|| {
            warn!(param = name, value, "Invalid date format in query param, using default value");
            default
        }),
    }
}

fn local_to_utc(naive: NaiveDateTime, earliest: bool) -> DateTime<Utc> {
    let local = Local.from_local_datetime(&naive);
    let resolved = if earliest { local.earliest() } else { local.latest() };
    resolved
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
