use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskUpdate};

/// Data access for `tasks` rows.
///
/// Every lookup is scoped by owner: a task that belongs to someone else is
/// reported exactly like a task that does not exist.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, user_id: i32, task: NewTask) -> Result<Task, AppError>;

    async fn list_for_user(&self, user_id: i32, skip: i64, limit: i64)
        -> Result<Vec<Task>, AppError>;

    async fn find_owned(&self, user_id: i32, task_id: i32) -> Result<Option<Task>, AppError>;

    /// Applies the present fields of `changes` and bumps `updated_at`.
    async fn update_owned(
        &self,
        user_id: i32,
        task_id: i32,
        changes: TaskUpdate,
    ) -> Result<Option<Task>, AppError>;

    /// Returns whether a row was deleted.
    async fn delete_owned(&self, user_id: i32, task_id: i32) -> Result<bool, AppError>;
}

pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, user_id: i32, task: NewTask) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (task_info, datetime_to_do, user_id)
             VALUES ($1, $2, $3)
             RETURNING id, task_info, datetime_to_do, created_at, updated_at, is_completed, user_id",
        )
        .bind(task.task_info)
        .bind(task.datetime_to_do)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list_for_user(
        &self,
        user_id: i32,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, task_info, datetime_to_do, created_at, updated_at, is_completed, user_id
             FROM tasks WHERE user_id = $1
             ORDER BY id
             OFFSET $2 LIMIT $3",
        )
        .bind(user_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn find_owned(&self, user_id: i32, task_id: i32) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, task_info, datetime_to_do, created_at, updated_at, is_completed, user_id
             FROM tasks WHERE id = $1 AND user_id = $2",
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update_owned(
        &self,
        user_id: i32,
        task_id: i32,
        changes: TaskUpdate,
    ) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks
             SET task_info = COALESCE($1, task_info),
                 datetime_to_do = COALESCE($2, datetime_to_do),
                 is_completed = COALESCE($3, is_completed),
                 updated_at = NOW()
             WHERE id = $4 AND user_id = $5
             RETURNING id, task_info, datetime_to_do, created_at, updated_at, is_completed, user_id",
        )
        .bind(changes.task_info)
        .bind(changes.datetime_to_do)
        .bind(changes.is_completed)
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn delete_owned(&self, user_id: i32, task_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
