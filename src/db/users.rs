use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, UserRecord};

/// Data access for `users` rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user, failing with `Conflict` when the username or email is taken.
    async fn create(&self, new_user: NewUser) -> Result<UserRecord, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError>;

    async fn find_by_id(&self, user_id: i32) -> Result<Option<UserRecord>, AppError>;

    /// Makes `token_id` the only refresh token accepted for the user.
    async fn set_refresh_token_id(&self, user_id: i32, token_id: Uuid) -> Result<(), AppError>;

    /// Replaces `current` with `next` if `current` is still the user's live
    /// refresh token id. Returns `false` when it is not.
    async fn rotate_refresh_token_id(
        &self,
        user_id: i32,
        current: Uuid,
        next: Uuid,
    ) -> Result<bool, AppError>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<UserRecord, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, (String,)>(
            "SELECT username FROM users WHERE username = $1 OR email = $2 LIMIT 1",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some((username,)) = existing {
            let message = if username == new_user.username {
                "Username already registered"
            } else {
                "Email already registered"
            };
            return Err(AppError::Conflict(message.into()));
        }

        let user = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (username, email, hashed_password)
             VALUES ($1, $2, $3)
             RETURNING id, username, email, hashed_password, refresh_token_id, is_active, created_at",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.hashed_password)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, hashed_password, refresh_token_id, is_active, created_at
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, hashed_password, refresh_token_id, is_active, created_at
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_refresh_token_id(&self, user_id: i32, token_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET refresh_token_id = $1 WHERE id = $2")
            .bind(token_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Unauthorized("User not found".into()));
        }
        Ok(())
    }

    async fn rotate_refresh_token_id(
        &self,
        user_id: i32,
        current: Uuid,
        next: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token_id = $1
             WHERE id = $2 AND refresh_token_id = $3 AND is_active",
        )
        .bind(next)
        .bind(user_id)
        .bind(current)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
