/// Task endpoints
///
/// Every handler runs behind the session gate and passes the caller's user
/// id into a single owner-scoped query. A task that belongs to someone else
/// answers exactly like a task that does not exist.
///
/// # Endpoints
///
/// - `GET    /tasks` - List the caller's tasks
/// - `POST   /tasks` - Create a task
/// - `PUT    /tasks/:id` - Partially update a task
/// - `DELETE /tasks/:id` - Delete a task
/// - `GET    /tasks/stats` - Status/priority counters
/// - `GET    /tasks/calendar?date=YYYY-MM-DD&priority=` - Tasks due on a day
/// - `GET    /tasks/recent` - Tasks, newest first

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{parse_id, MessageResponse},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use taskdeck_shared::{
    auth::middleware::Session,
    models::task::{Task, TaskStats},
    validation::{validate_calendar_query, validate_create, validate_update},
};

const TASK_NOT_FOUND: &str = "Task not found";

/// List tasks
///
/// ```text
/// GET /tasks
/// Authorization: Bearer <token>
/// ```
///
/// Returns a JSON array of tasks in storage order.
pub async fn list_tasks(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_for_user(&state.db, session.user_id).await?;
    Ok(Json(tasks))
}

/// Create a task
///
/// ```text
/// POST /tasks
/// Content-Type: application/json
///
/// {
///   "title": "Write spec",
///   "priority": "high",
///   "status": "todo",
///   "dueDate": "2025-03-04"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `500 Internal Server Error`: storage failure (including a project or
///   category that the caller does not own)
pub async fn create_task(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(body) = body?;
    let new_task = validate_create(&body)?;

    let task = Task::create(&state.db, session.user_id, new_task).await?;
    tracing::info!(user_id = session.user_id, task_id = task.id, "Task created");

    Ok(Json(task))
}

/// Update a task
///
/// Any subset of `title`, `description`, `priority`, `status`, `dueDate`,
/// `projectId`, `categoryId`, `favorite`. An empty object only refreshes
/// `updatedAt`.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `404 Not Found`: no such task for this user
pub async fn update_task(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id, TASK_NOT_FOUND)?;
    let Json(body) = body?;
    let patch = validate_update(&body)?;

    let task = Task::update_for_user(&state.db, id, session.user_id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;

    tracing::info!(user_id = session.user_id, task_id = task.id, "Task updated");
    Ok(Json(task))
}

/// Delete a task
///
/// Returns `{"message": "Task deleted successfully"}`; a second delete of the
/// same id is a 404.
pub async fn delete_task(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, TASK_NOT_FOUND)?;

    if !Task::delete_for_user(&state.db, id, session.user_id).await? {
        return Err(ApiError::NotFound(TASK_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = session.user_id, task_id = id, "Task deleted");
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

/// Status and priority counters
pub async fn task_stats(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<TaskStats>> {
    let stats = Task::stats_for_user(&state.db, session.user_id).await?;
    Ok(Json(stats))
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub date: Option<String>,
    pub priority: Option<String>,
}

/// Tasks due on one UTC day
///
/// ```text
/// GET /tasks/calendar?date=2025-03-04&priority=high
/// ```
pub async fn tasks_due_on(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CalendarQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let (date, priority) = validate_calendar_query(query.date.as_deref(), query.priority.as_deref())?;

    let tasks = Task::list_due_on(&state.db, session.user_id, date, priority).await?;
    Ok(Json(tasks))
}

/// Recent activity feed
pub async fn recent_tasks(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_recent(&state.db, session.user_id).await?;
    Ok(Json(tasks))
}
