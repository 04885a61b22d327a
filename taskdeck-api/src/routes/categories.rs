/// Category endpoints
///
/// - `GET    /categories`
/// - `POST   /categories` (`name`)
/// - `DELETE /categories/:id`

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
use taskdeck_shared::{auth::middleware::Session, models::category::Category, validation::validate_category};

const CATEGORY_NOT_FOUND: &str = "Category not found";

pub async fn list_categories(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = Category::list_for_user(&state.db, session.user_id).await?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Category>> {
    let Json(body) = body?;
    let name = validate_category(&body)?;

    let category = Category::create(&state.db, session.user_id, &name).await?;
    tracing::info!(user_id = session.user_id, category_id = category.id, "Category created");

    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, CATEGORY_NOT_FOUND)?;

    if !Category::delete_for_user(&state.db, id, session.user_id).await? {
        return Err(ApiError::NotFound(CATEGORY_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = session.user_id, category_id = id, "Category deleted");
    Ok(Json(MessageResponse::new("Category deleted successfully")))
}
