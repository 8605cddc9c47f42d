use crate::{
    auth::AuthenticatedIdentity,
    error::AppError,
    models::{TaskInput, TaskQuery, TaskUpdate},
    task_store::TaskStore,
};
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Retrieves tasks, newest first.
///
/// ## Query Parameters:
/// - `status` (optional): e.g. "todo", "in_progress", "done".
/// - `priority` (optional): e.g. "low", "medium", "high".
/// - `search` (optional): case-insensitive match on title and description.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Task` objects.
/// - `401 Unauthorized`: if the request lacks a valid authentication token.
pub async fn list_tasks(
    tasks: web::Data<TaskStore>,
    query_params: web::Query<TaskQuery>,
) -> impl Responder {
    HttpResponse::Ok().json(tasks.list(&query_params))
}

/// Creates a new task owned by the caller. Admin only.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: invalid payload (e.g. empty title).
/// - `401 Unauthorized` / `403 Forbidden`: not authenticated / not an admin.
pub async fn create_task(
    identity: AuthenticatedIdentity,
    tasks: web::Data<TaskStore>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = tasks.create(task_data.into_inner(), identity.user_id);
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its id.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `401 Unauthorized`: if the request lacks a valid authentication token.
/// - `404 Not Found`: no task with that id.
pub async fn get_task(
    tasks: web::Data<TaskStore>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let task = tasks.get(&task_id)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Applies a partial update to a task. Admin only.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: invalid fields, or no fields at all.
/// - `404 Not Found`: no task with that id.
pub async fn update_task(
    tasks: web::Data<TaskStore>,
    task_id: web::Path<String>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = tasks.update(&task_id, task_data.into_inner())?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task. Admin only.
///
/// ## Responses:
/// - `204 No Content`: on successful deletion.
/// - `404 Not Found`: no task with that id.
pub async fn delete_task(
    identity: AuthenticatedIdentity,
    tasks: web::Data<TaskStore>,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    tasks.delete(&task_id)?;
    log::info!("task {} deleted by user id={}", task_id, identity.user_id);
    Ok(HttpResponse::NoContent().finish())
}
