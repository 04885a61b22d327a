/// Project endpoints
///
/// - `GET    /projects` - List the caller's projects
/// - `POST   /projects` - Create a project (`name`, optional `description`)
/// - `DELETE /projects/:id` - Delete a project; its tasks are detached

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{parse_id, MessageResponse},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;
use taskdeck_shared::{auth::middleware::Session, models::project::Project, validation::validate_project};

const PROJECT_NOT_FOUND: &str = "Project not found";

pub async fn list_projects(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = Project::list_for_user(&state.db, session.user_id).await?;
    Ok(Json(projects))
}

pub async fn create_project(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Project>> {
    let Json(body) = body?;
    let data = validate_project(&body)?;

    let project = Project::create(&state.db, session.user_id, data).await?;
    tracing::info!(user_id = session.user_id, project_id = project.id, "Project created");

    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, PROJECT_NOT_FOUND)?;

    if !Project::delete_for_user(&state.db, id, session.user_id).await? {
        return Err(ApiError::NotFound(PROJECT_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = session.user_id, project_id = id, "Project deleted");
    Ok(Json(MessageResponse::new("Project deleted successfully")))
}
