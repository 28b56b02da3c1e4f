//! Data-access capabilities. Every method maps constraint violations onto
//! [`StoreError`](crate::error::StoreError) variants so callers can branch on
//! the kind of failure.

pub mod attendance;
#[cfg(test)]
pub mod memory;
pub mod role;
pub mod schedule;
pub mod shift;
pub mod user;

use crate::{
    error::StoreResult,
    model::{
        attendance::Attendance,
        role::Role,
        schedule::{NewSchedule, Schedule},
        shift::{NewShift, Shift},
        user::{NewUser, User, UserChanges},
    },
    utils::pagination::Pagination,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;
use std::sync::Arc;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// `Duplicate` on a taken username or email, `InvalidReference` on an unknown role.
    async fn create(&self, user: &NewUser) -> StoreResult<u64>;
    async fn find_by_id(&self, id: u64) -> StoreResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn username_exists(&self, username: &str) -> StoreResult<bool>;
    /// Ordered by id.
    async fn list(&self, pagination: Pagination) -> StoreResult<(Vec<User>, u64)>;
    async fn update(&self, id: u64, changes: &UserChanges) -> StoreResult<()>;
    async fn update_password(&self, id: u64, password_hash: &str) -> StoreResult<()>;
    /// `StillReferenced` while schedules or attendance rows point at the user.
    async fn delete(&self, id: u64) -> StoreResult<()>;
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn create(&self, name: &str) -> StoreResult<u64>;
    async fn find_by_id(&self, id: u64) -> StoreResult<Option<Role>>;
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Role>>;
    /// Ordered by id.
    async fn list(&self) -> StoreResult<Vec<Role>>;
    async fn update(&self, id: u64, name: &str) -> StoreResult<()>;
    async fn delete(&self, id: u64) -> StoreResult<()>;
    async fn count_users(&self, id: u64) -> StoreResult<u64>;
}

#[async_trait]
pub trait ShiftRepository: Send + Sync {
    async fn create(&self, shift: &NewShift) -> StoreResult<u64>;
    async fn find_by_id(&self, id: u64) -> StoreResult<Option<Shift>>;
    /// Ordered by name.
    async fn list(&self) -> StoreResult<Vec<Shift>>;
    async fn update(&self, id: u64, shift: &NewShift) -> StoreResult<()>;
    /// `StillReferenced` while a schedule uses the shift.
    async fn delete(&self, id: u64) -> StoreResult<()>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// `Duplicate` when the user already has a schedule that day,
    /// `InvalidReference` on an unknown user or shift.
    async fn create(&self, schedule: &NewSchedule) -> StoreResult<u64>;
    async fn find_for_user_on(&self, user_id: u64, date: NaiveDate) -> StoreResult<Option<Schedule>>;
    /// Inclusive range, date ascending.
    async fn list_for_user(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        pagination: Pagination,
    ) -> StoreResult<(Vec<Schedule>, u64)>;
    /// Inclusive range, date then username ascending, with user summaries.
    async fn list_all(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        pagination: Pagination,
    ) -> StoreResult<(Vec<Schedule>, u64)>;
    async fn update(&self, id: u64, schedule: &NewSchedule) -> StoreResult<()>;
    async fn delete(&self, id: u64) -> StoreResult<()>;
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn create(&self, user_id: u64, check_in_at: DateTime<Utc>, notes: Option<&str>) -> StoreResult<u64>;
    /// Most recent record by check-in time.
    async fn last_for_user(&self, user_id: u64) -> StoreResult<Option<Attendance>>;
    /// Stamps the check-out on a still-open record. Returns false when the
    /// record was already closed.
    async fn close(&self, id: u64, check_out_at: DateTime<Utc>, notes: Option<&str>) -> StoreResult<bool>;
    /// Check-in within `[from, to]`, newest first.
    async fn list_for_user(
        &self,
        user_id: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        pagination: Pagination,
    ) -> StoreResult<(Vec<Attendance>, u64)>;
    /// Check-in within `[from, to]`, newest first then username, with user summaries.
    async fn list_all(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        pagination: Pagination,
    ) -> StoreResult<(Vec<Attendance>, u64)>;
}

/// One handle per capability, shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub shifts: Arc<dyn ShiftRepository>,
    pub schedules: Arc<dyn ScheduleRepository>,
    pub attendance: Arc<dyn AttendanceRepository>,
}

impl Repositories {
    pub fn mysql(pool: MySqlPool) -> Self {
        Self {
            users: Arc::new(user::MySqlUserRepository::new(pool.clone())),
            roles: Arc::new(role::MySqlRoleRepository::new(pool.clone())),
            shifts: Arc::new(shift::MySqlShiftRepository::new(pool.clone())),
            schedules: Arc::new(schedule::MySqlScheduleRepository::new(pool.clone())),
            attendance: Arc::new(attendance::MySqlAttendanceRepository::new(pool)),
        }
    }

    #[cfg(test)]
    pub fn memory(store: Arc<memory::MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            roles: store.clone(),
            shifts: store.clone(),
            schedules: store.clone(),
            attendance: store,
        }
    }
}

pub(crate) fn limit_offset(pagination: Pagination) -> (i64, i64) {
    (i64::from(pagination.limit), pagination.offset() as i64)
}
