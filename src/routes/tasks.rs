use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{NewTask, TaskListQuery, TaskUpdate},
    services::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Retrieves the authenticated user's tasks, ordered by id.
///
/// ## Query Parameters:
/// - `skip` (optional): number of tasks to skip, default 0.
/// - `limit` (optional): maximum number of tasks, 1 to 1000, default 100.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Task` objects.
/// - `401 Unauthorized`: missing or invalid access token.
/// - `422 Unprocessable Entity`: `skip` or `limit` out of range.
#[get("/")]
pub async fn list_tasks(
    tasks: web::Data<TaskService>,
    query: web::Query<TaskListQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    query.validate()?;

    let tasks = tasks.list(user.id, &query).await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// ## Request Body:
/// - `task_info`: what has to be done, 3 to 1000 characters, no HTML.
/// - `datetime_to_do`: RFC 3339 or naive ISO timestamp (read as UTC).
///
/// ## Responses:
/// - `201 Created`: the new `Task`, with `is_completed` set to `false`.
/// - `401 Unauthorized`: missing or invalid access token.
/// - `422 Unprocessable Entity`: invalid body.
#[post("/create")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<NewTask>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks.create(user.id, task_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a single task owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `401 Unauthorized`: missing or invalid access token.
/// - `404 Not Found`: no such task for this user.
#[get("/{task_id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i32>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks.get(user.id, task_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task owned by the authenticated user.
///
/// ## Request Body:
/// Any of `task_info`, `datetime_to_do` and `is_completed`. Absent fields keep
/// their value.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `401 Unauthorized`: missing or invalid access token.
/// - `404 Not Found`: no such task for this user.
/// - `422 Unprocessable Entity`: invalid body.
#[put("/{task_id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskUpdate>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks
        .update(user.id, task_id.into_inner(), task_data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task owned by the authenticated user.
///
/// ## Responses:
/// - `204 No Content`: the task is gone.
/// - `401 Unauthorized`: missing or invalid access token.
/// - `404 Not Found`: no such task for this user.
#[delete("/{task_id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<i32>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    tasks.delete(user.id, task_id.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}
