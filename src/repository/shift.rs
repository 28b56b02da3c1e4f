use crate::{
    error::{StoreError, StoreResult},
    model::shift::{NewShift, Shift},
    repository::ShiftRepository,
};
use async_trait::async_trait;
use sqlx::MySqlPool;

const SELECT_SHIFT: &str = "SELECT id, name, start_time, end_time, created_at, updated_at FROM shifts";

pub struct MySqlShiftRepository {
    pool: MySqlPool,
}

impl MySqlShiftRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShiftRepository for MySqlShiftRepository {
    async fn create(&self, shift: &NewShift) -> StoreResult<u64> {
        let result = sqlx::query("INSERT INTO shifts (name, start_time, end_time) VALUES (?, ?, ?)")
            .bind(&shift.name)
            .bind(shift.start_time)
            .bind(shift.end_time)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_write)?;
        Ok(result.last_insert_id())
    }

    async fn find_by_id(&self, id: u64) -> StoreResult<Option<Shift>> {
        let shift = sqlx::query_as::<_, Shift>(&format!("{SELECT_SHIFT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(shift)
    }

    async fn list(&self) -> StoreResult<Vec<Shift>> {
        let shifts = sqlx::query_as::<_, Shift>(&format!("{SELECT_SHIFT} ORDER BY name ASC"))
            .fetch_all(&self.pool)
            .await?;
        Ok(shifts)
    }

    async fn update(&self, id: u64, shift: &NewShift) -> StoreResult<()> {
        let result = sqlx::query("UPDATE shifts SET name = ?, start_time = ?, end_time = ? WHERE id = ?")
            .bind(&shift.name)
            .bind(shift.start_time)
            .bind(shift.end_time)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_write)?;

        if result.rows_affected() == 0 && self.find_by_id(id).await?.is_none() {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: u64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM shifts WHERE id = ?")
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
