use crate::{
    error::{StoreError, StoreResult},
    model::user::{NewUser, User, UserChanges, UserRow},
    repository::{UserRepository, limit_offset},
    utils::pagination::Pagination,
};
use async_trait::async_trait;
use sqlx::MySqlPool;

const SELECT_USER: &str = r#"
    SELECT u.id, u.username, u.password_hash, u.email, u.first_name, u.last_name,
           u.role_id, r.name AS role_name, u.created_at, u.updated_at
    FROM users u
    JOIN roles r ON r.id = u.role_id
"#;

pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: u64) -> StoreResult<bool> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(found != 0)
    }

    /// MySQL reports zero affected rows when the new values equal the old
    /// ones, so a zero count only means "missing" if the row is gone.
    async fn ensure_updated(&self, id: u64, rows_affected: u64) -> StoreResult<()> {
        if rows_affected == 0 && !self.exists(id).await? {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn create(&self, user: &NewUser) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, email, first_name, last_name, role_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_write)?;

        Ok(result.last_insert_id())
    }

    async fn find_by_id(&self, id: u64) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE u.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE u.username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(found != 0)
    }

    async fn list(&self, pagination: Pagination) -> StoreResult<(Vec<User>, u64)> {
        let (limit, offset) = limit_offset(pagination);

        let rows = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} ORDER BY u.id ASC LIMIT ? OFFSET ?"))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(User::from).collect(), total as u64))
    }

    async fn update(&self, id: u64, changes: &UserChanges) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = ?, email = ?, first_name = ?, last_name = ?, role_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(changes.role_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_write)?;

        self.ensure_updated(id, result.rows_affected()).await
    }

    async fn update_password(&self, id: u64, password_hash: &str) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.ensure_updated(id, result.rows_affected()).await
    }

    async fn delete(&self, id: u64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
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
