/// Category model
///
/// Same ownership rules as projects: scoped by `user_id`, referenced from
/// tasks through `(category_id, user_id)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub async fn list_for_user(pool: &PgPool, user_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, user_id, created_at FROM categories WHERE user_id = $1 ORDER BY name ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &PgPool, user_id: i32, name: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, user_id)
            VALUES ($1, $2)
            RETURNING id, name, user_id, created_at
            "#,
        )
        .bind(name)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Deletes the category matching both `id` and `user_id`, detaching its tasks
    pub async fn delete_for_user(pool: &PgPool, id: i32, user_id: i32) -> Result<bool, sqlx::Error> {
        let deleted: Option<i32> = sqlx::query_scalar(
            r#"
            WITH detached AS (
                UPDATE tasks SET category_id = NULL, updated_at = NOW()
                WHERE category_id = $1 AND user_id = $2
            )
            DELETE FROM categories WHERE id = $1 AND user_id = $2
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(deleted.is_some())
    }
}
