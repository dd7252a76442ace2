use std::sync::Arc;

use crate::db::TaskRepository;
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskListQuery, TaskUpdate};

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Task operations on behalf of an authenticated user.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    pub async fn create(&self, user_id: i32, mut task: NewTask) -> Result<Task, AppError> {
        task.task_info = task.task_info.trim().to_string();
        let task = self.tasks.create(user_id, task).await?;
        log::info!("User {} created task {}", user_id, task.id);
        Ok(task)
    }

    pub async fn list(&self, user_id: i32, query: &TaskListQuery) -> Result<Vec<Task>, AppError> {
        self.tasks
            .list_for_user(user_id, query.skip(), query.limit())
            .await
    }

    pub async fn get(&self, user_id: i32, task_id: i32) -> Result<Task, AppError> {
        self.tasks
            .find_owned(user_id, task_id)
            .await?
            .ok_or_else(not_found)
    }

    /// Applies a partial update. An update with no fields returns the task as is.
    pub async fn update(
        &self,
        user_id: i32,
        task_id: i32,
        mut changes: TaskUpdate,
    ) -> Result<Task, AppError> {
        if changes.is_empty() {
            return self.get(user_id, task_id).await;
        }
        if let Some(info) = changes.task_info.as_mut() {
            *info = info.trim().to_string();
        }

        let task = self
            .tasks
            .update_owned(user_id, task_id, changes)
            .await?
            .ok_or_else(not_found)?;
        log::info!("User {} updated task {}", user_id, task_id);
        Ok(task)
    }

    pub async fn delete(&self, user_id: i32, task_id: i32) -> Result<(), AppError> {
        if !self.tasks.delete_owned(user_id, task_id).await? {
            return Err(not_found());
        }
        log::info!("User {} deleted task {}", user_id, task_id);
        Ok(())
    }
}
