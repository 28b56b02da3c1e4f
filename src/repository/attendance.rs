use crate::{
    error::{StoreError, StoreResult},
    model::attendance::{Attendance, AttendanceReportRow},
    repository::{AttendanceRepository, limit_offset},
    utils::pagination::Pagination,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

const SELECT_ATTENDANCE: &str =
    "SELECT id, user_id, check_in_at, check_out_at, notes, created_at, updated_at FROM attendances";

pub struct MySqlAttendanceRepository {
    pool: MySqlPool,
}

impl MySqlAttendanceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceRepository for MySqlAttendanceRepository {
    async fn create(&self, user_id: u64, check_in_at: DateTime<Utc>, notes: Option<&str>) -> StoreResult<u64> {
        let result = sqlx::query("INSERT INTO attendances (user_id, check_in_at, notes) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(check_in_at)
            .bind(notes)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_write)?;
        Ok(result.last_insert_id())
    }

    async fn last_for_user(&self, user_id: u64) -> StoreResult<Option<Attendance>> {
        let attendance = sqlx::query_as::<_, Attendance>(&format!(
            "{SELECT_ATTENDANCE} WHERE user_id = ? ORDER BY check_in_at DESC, id DESC LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attendance)
    }

    async fn close(&self, id: u64, check_out_at: DateTime<Utc>, notes: Option<&str>) -> StoreResult<bool> {
        // the IS NULL guard lets exactly one of two racing check-outs win
        let result = sqlx::query(
            r#"
            UPDATE attendances
            SET check_out_at = ?, notes = COALESCE(?, notes)
            WHERE id = ? AND check_out_at IS NULL
            "#,
        )
        .bind(check_out_at)
        .bind(notes)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_write)?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_for_user(
        &self,
        user_id: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        pagination: Pagination,
    ) -> StoreResult<(Vec<Attendance>, u64)> {
        let (limit, offset) = limit_offset(pagination);

        let rows = sqlx::query_as::<_, Attendance>(&format!(
            "{SELECT_ATTENDANCE} WHERE user_id = ? AND check_in_at BETWEEN ? AND ? ORDER BY check_in_at DESC LIMIT ? OFFSET ?"
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM attendances WHERE user_id = ? AND check_in_at BETWEEN ? AND ?",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total as u64))
    }

    async fn list_all(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        pagination: Pagination,
    ) -> StoreResult<(Vec<Attendance>, u64)> {
        let (limit, offset) = limit_offset(pagination);

        let rows = sqlx::query_as::<_, AttendanceReportRow>(
            r#"
            SELECT a.id, a.user_id, a.check_in_at, a.check_out_at, a.notes, a.created_at, a.updated_at,
                   u.username, u.email, u.first_name, u.last_name
            FROM attendances a
            JOIN users u ON u.id = a.user_id
            WHERE a.check_in_at BETWEEN ? AND ?
            ORDER BY a.check_in_at DESC, u.username ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendances WHERE check_in_at BETWEEN ? AND ?")
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Attendance::from).collect(), total as u64))
    }
}
