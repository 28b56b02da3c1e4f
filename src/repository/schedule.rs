use crate::{
    error::{StoreError, StoreResult},
    model::schedule::{NewSchedule, Schedule, ScheduleReportRow, ScheduleRow},
    repository::{ScheduleRepository, limit_offset},
    utils::pagination::Pagination,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

const SELECT_SCHEDULE: &str = r#"
    SELECT us.id, us.user_id, us.shift_id, us.date, us.created_at,
           s.name AS shift_name, s.start_time, s.end_time
    FROM user_schedules us
    JOIN shifts s ON s.id = us.shift_id
"#;

const SELECT_SCHEDULE_REPORT: &str = r#"
    SELECT us.id, us.user_id, us.shift_id, us.date, us.created_at,
           s.name AS shift_name, s.start_time, s.end_time,
           u.username, u.email, u.first_name, u.last_name
    FROM user_schedules us
    JOIN shifts s ON s.id = us.shift_id
    JOIN users u ON u.id = us.user_id
"#;

pub struct MySqlScheduleRepository {
    pool: MySqlPool,
}

impl MySqlScheduleRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for MySqlScheduleRepository {
    async fn create(&self, schedule: &NewSchedule) -> StoreResult<u64> {
        let result = sqlx::query("INSERT INTO user_schedules (user_id, shift_id, date) VALUES (?, ?, ?)")
            .bind(schedule.user_id)
            .bind(schedule.shift_id)
            .bind(schedule.date)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_write)?;
        Ok(result.last_insert_id())
    }

    async fn find_for_user_on(&self, user_id: u64, date: NaiveDate) -> StoreResult<Option<Schedule>> {
        let row = sqlx::query_as::<_, ScheduleRow>(&format!(
            "{SELECT_SCHEDULE} WHERE us.user_id = ? AND us.date = ?"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Schedule::from))
    }

    async fn list_for_user(
        &self,
        user_id: u64,
        start: NaiveDate,
        end: NaiveDate,
        pagination: Pagination,
    ) -> StoreResult<(Vec<Schedule>, u64)> {
        let (limit, offset) = limit_offset(pagination);

        let rows = sqlx::query_as::<_, ScheduleRow>(&format!(
            "{SELECT_SCHEDULE} WHERE us.user_id = ? AND us.date BETWEEN ? AND ? ORDER BY us.date ASC LIMIT ? OFFSET ?"
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_schedules WHERE user_id = ? AND date BETWEEN ? AND ?",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows.into_iter().map(Schedule::from).collect(), total as u64))
    }

    async fn list_all(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        pagination: Pagination,
    ) -> StoreResult<(Vec<Schedule>, u64)> {
        let (limit, offset) = limit_offset(pagination);

        let rows = sqlx::query_as::<_, ScheduleReportRow>(&format!(
            "{SELECT_SCHEDULE_REPORT} WHERE us.date BETWEEN ? AND ? ORDER BY us.date ASC, u.username ASC LIMIT ? OFFSET ?"
        ))
        .bind(start)
        .bind(end)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_schedules WHERE date BETWEEN ? AND ?")
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Schedule::from).collect(), total as u64))
    }

    async fn update(&self, id: u64, schedule: &NewSchedule) -> StoreResult<()> {
        let result = sqlx::query("UPDATE user_schedules SET user_id = ?, shift_id = ?, date = ? WHERE id = ?")
            .bind(schedule.user_id)
            .bind(schedule.shift_id)
            .bind(schedule.date)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_write)?;

        if result.rows_affected() == 0 {
            let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM user_schedules WHERE id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
            if found == 0 {
                return Err(StoreError::NotFound);
            }
        }
        Ok(())
    }

    async fn delete(&self, id: u64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM user_schedules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_delete)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
