/// Project model
///
/// A project groups tasks of one user. Tasks reference projects through the
/// composite key `(project_id, user_id)`, so a task can never point at another
/// user's project.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
}

impl Project {
    pub async fn list_for_user(pool: &PgPool, user_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, user_id, created_at
            FROM projects
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn create(
        pool: &PgPool,
        user_id: i32,
        data: CreateProject,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, user_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Deletes the project matching both `id` and `user_id`
    ///
    /// Tasks of the same user that point at the project are detached in the
    /// same statement. Returns false when no project matched.
    pub async fn delete_for_user(pool: &PgPool, id: i32, user_id: i32) -> Result<bool, sqlx::Error> {
        let deleted: Option<i32> = sqlx::query_scalar(
            r#"
            WITH detached AS (
                UPDATE tasks SET project_id = NULL, updated_at = NOW()
                WHERE project_id = $1 AND user_id = $2
            )
            DELETE FROM projects WHERE id = $1 AND user_id = $2
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
