/// Task model and database operations
///
/// Tasks are the core entity of Taskdeck. Every query in this module that reads
/// or writes an individual task takes the caller's user id and puts it in the
/// same `WHERE` clause as the task id, so a row that belongs to another user
/// is indistinguishable from a row that does not exist.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id SERIAL PRIMARY KEY,
///     title TEXT NOT NULL CHECK (length(title) > 0),
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date TIMESTAMPTZ,
///     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     project_id INTEGER,
///     category_id INTEGER,
///     favorite BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     FOREIGN KEY (project_id, user_id) REFERENCES projects(id, user_id),
///     FOREIGN KEY (category_id, user_id) REFERENCES categories(id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::task::{NewTask, Task, TaskPatch, TaskPriority};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, user_id: i32) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, user_id, NewTask {
///     title: "Write spec".to_string(),
///     priority: Some(TaskPriority::High),
///     ..Default::default()
/// }).await?;
///
/// let patch = TaskPatch { favorite: Some(true), ..Default::default() };
/// let updated = Task::update_for_user(&pool, task.id, user_id, &patch).await?;
/// assert!(updated.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::fmt;
use std::str::FromStr;

const TASK_COLUMNS: &str = "id, title, description, status, priority, due_date, user_id, \
                            project_id, category_id, favorite, created_at, updated_at";

/// Workflow status of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// All statuses, in display order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                value: s.to_string(),
                expected: "todo, in_progress, done",
            })
    }
}

/// Priority of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// All priorities, lowest first
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                value: s.to_string(),
                expected: "low, medium, high",
            })
    }
}

/// Returned when a string is not one of an enum's wire values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value '{value}', expected one of: {expected}")]
pub struct UnknownVariant {
    pub value: String,
    pub expected: &'static str,
}

/// Task row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Server-assigned id (always positive)
    pub id: i32,

    /// Short title, never empty
    pub title: String,

    /// Free-form description
    pub description: Option<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,

    /// Owning user
    pub user_id: i32,

    /// Optional project (owned by the same user)
    pub project_id: Option<i32>,

    /// Optional category (owned by the same user)
    pub category_id: Option<i32>,

    /// Starred by the user
    pub favorite: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the due date falls on the given UTC calendar day
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.due_date
            .map(|due| due.date_naive() == date)
            .unwrap_or(false)
    }
}

/// Validated input for creating a task
///
/// `status` and `priority` fall back to the column defaults (todo, medium)
/// when left as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
}

impl NewTask {
    /// Copy with `status`/`priority`/`favorite` resolved to their defaults
    pub fn with_defaults(&self) -> Self {
        Self {
            status: Some(self.status.unwrap_or_default()),
            priority: Some(self.priority.unwrap_or_default()),
            favorite: Some(self.favorite.unwrap_or(false)),
            ..self.clone()
        }
    }
}

/// Validated partial update for a task
///
/// Only `Some` fields are written. `project_id`/`category_id` use a nested
/// option so `Some(None)` detaches the task.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<i32>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<i32>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
}

impl TaskPatch {
    /// True when no field is set (the update only bumps `updated_at`)
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Applies the set fields to an in-memory task
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
        if let Some(category_id) = self.category_id {
            task.category_id = category_id;
        }
        if let Some(favorite) = self.favorite {
            task.favorite = favorite;
        }
    }
}

/// Counters behind the analytics view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    /// `completed / total`, 0.0 when there are no tasks
    pub completion_rate: f64,
    pub by_status: StatusBreakdown,
    pub by_priority: PriorityBreakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub todo: i64,
    pub in_progress: i64,
    pub done: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

impl TaskStats {
    /// Builds stats from the two breakdowns; totals are derived from status
    pub fn from_breakdowns(by_status: StatusBreakdown, by_priority: PriorityBreakdown) -> Self {
        let total = by_status.todo + by_status.in_progress + by_status.done;
        let completed = by_status.done;
        let completion_rate = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64
        };

        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate,
            by_status,
            by_priority,
        }
    }

    /// Computes stats over an in-memory task list
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut by_status = StatusBreakdown::default();
        let mut by_priority = PriorityBreakdown::default();

        for task in tasks {
            match task.status {
                TaskStatus::Todo => by_status.todo += 1,
                TaskStatus::InProgress => by_status.in_progress += 1,
                TaskStatus::Done => by_status.done += 1,
            }
            match task.priority {
                TaskPriority::Low => by_priority.low += 1,
                TaskPriority::Medium => by_priority.medium += 1,
                TaskPriority::High => by_priority.high += 1,
            }
        }

        Self::from_breakdowns(by_status, by_priority)
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    todo: i64,
    in_progress: i64,
    done: i64,
    low: i64,
    medium: i64,
    high: i64,
}

impl Task {
    /// Lists every task owned by `user_id` in storage order
    pub async fn list_for_user(pool: &PgPool, user_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Inserts a task owned by `user_id` and returns the persisted row
    ///
    /// # Errors
    ///
    /// Fails with a database error if `project_id`/`category_id` does not name
    /// a row owned by the same user.
    pub async fn create(pool: &PgPool, user_id: i32, data: NewTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (title, description, status, priority, due_date,
                               user_id, project_id, category_id, favorite)
            VALUES ($1, $2,
                    COALESCE($3, 'todo'::task_status),
                    COALESCE($4, 'medium'::task_priority),
                    $5, $6, $7, $8, COALESCE($9, FALSE))
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(user_id)
        .bind(data.project_id)
        .bind(data.category_id)
        .bind(data.favorite)
        .fetch_one(pool)
        .await
    }

    /// Finds a task by id, only if it belongs to `user_id`
    pub async fn find_for_user(
        pool: &PgPool,
        id: i32,
        user_id: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Applies `patch` to the task matching both `id` and `user_id`
    ///
    /// Returns `None` when no row matches. `updated_at` is always refreshed,
    /// even for an empty patch.
    pub async fn update_for_user(
        pool: &PgPool,
        id: i32,
        user_id: i32,
        patch: &TaskPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(title) = &patch.title {
            query.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &patch.description {
            query.push(", description = ").push_bind(description.clone());
        }
        if let Some(status) = patch.status {
            query.push(", status = ").push_bind(status);
        }
        if let Some(priority) = patch.priority {
            query.push(", priority = ").push_bind(priority);
        }
        if let Some(due_date) = patch.due_date {
            query.push(", due_date = ").push_bind(due_date);
        }
        if let Some(project_id) = patch.project_id {
            query.push(", project_id = ").push_bind(project_id);
        }
        if let Some(category_id) = patch.category_id {
            query.push(", category_id = ").push_bind(category_id);
        }
        if let Some(favorite) = patch.favorite {
            query.push(", favorite = ").push_bind(favorite);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(user_id)
            .push(" RETURNING ")
            .push(TASK_COLUMNS);

        query.build_query_as::<Task>().fetch_optional(pool).await
    }

    /// Hard-deletes the task matching both `id` and `user_id`
    ///
    /// Returns false when no row matched.
    pub async fn delete_for_user(pool: &PgPool, id: i32, user_id: i32) -> Result<bool, sqlx::Error> {
        let deleted: Option<i32> =
            sqlx::query_scalar("DELETE FROM tasks WHERE id = $1 AND user_id = $2 RETURNING id")
                .bind(id)
                .bind(user_id)
                .fetch_optional(pool)
                .await?;

        Ok(deleted.is_some())
    }

    /// Aggregates status/priority counters for `user_id` in one query
    pub async fn stats_for_user(pool: &PgPool, user_id: i32) -> Result<TaskStats, sqlx::Error> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'todo')        AS todo,
                COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
                COUNT(*) FILTER (WHERE status = 'done')        AS done,
                COUNT(*) FILTER (WHERE priority = 'low')       AS low,
                COUNT(*) FILTER (WHERE priority = 'medium')    AS medium,
                COUNT(*) FILTER (WHERE priority = 'high')      AS high
            FROM tasks
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(TaskStats::from_breakdowns(
            StatusBreakdown {
                todo: row.todo,
                in_progress: row.in_progress,
                done: row.done,
            },
            PriorityBreakdown {
                low: row.low,
                medium: row.medium,
                high: row.high,
            },
        ))
    }

    /// Tasks due on the given UTC day, optionally restricted to one priority
    pub async fn list_due_on(
        pool: &PgPool,
        user_id: i32,
        date: NaiveDate,
        priority: Option<TaskPriority>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let start = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let end = start + chrono::Duration::days(1);

        sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS} FROM tasks
            WHERE user_id = $1
              AND due_date >= $2 AND due_date < $3
              AND ($4::task_priority IS NULL OR priority = $4)
            ORDER BY due_date ASC, id ASC
            "#
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .bind(priority)
        .fetch_all(pool)
        .await
    }

    /// Every task of `user_id`, newest first
    pub async fn list_recent(pool: &PgPool, user_id: i32) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        Task {
            id: 7,
            title: "Write spec".to_string(),
            description: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::High,
            due_date: Some(Utc.with_ymd_and_hms(2025, 3, 4, 17, 0, 0).unwrap()),
            user_id: 1,
            project_id: Some(3),
            category_id: None,
            favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::Done.as_str(), "done");
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            serde_json::json!("in_progress")
        );
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!("in_progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("high".parse::<TaskPriority>(), Ok(TaskPriority::High));

        let err = "urgent".parse::<TaskPriority>().unwrap_err();
        assert_eq!(err.value, "urgent");
        assert!(err.to_string().contains("low, medium, high"));
        assert!("DONE".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);

        let resolved = NewTask {
            title: "t".to_string(),
            ..Default::default()
        }
        .with_defaults();
        assert_eq!(resolved.status, Some(TaskStatus::Todo));
        assert_eq!(resolved.priority, Some(TaskPriority::Medium));
        assert_eq!(resolved.favorite, Some(false));
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let value = serde_json::to_value(sample_task()).unwrap();
        assert_eq!(value["title"], "Write spec");
        assert_eq!(value["priority"], "high");
        assert_eq!(value["status"], "todo");
        assert_eq!(value["favorite"], false);
        assert_eq!(value["userId"], 1);
        assert_eq!(value["projectId"], 3);
        assert!(value["categoryId"].is_null());
        assert!(value["dueDate"].is_string());
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_patch_apply_only_touches_set_fields() {
        let mut task = sample_task();
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            project_id: Some(None),
            ..Default::default()
        };

        patch.apply_to(&mut task);

        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.project_id, None);
        assert_eq!(task.title, "Write spec");
        assert_eq!(task.priority, TaskPriority::High);
    }

    #[test]
    fn test_patch_serialization_skips_unset_and_keeps_detach() {
        let patch = TaskPatch {
            title: Some("New".to_string()),
            category_id: Some(None),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 2);
        assert_eq!(object["title"], "New");
        assert!(object["categoryId"].is_null());
        assert!(TaskPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_is_due_on() {
        let task = sample_task();
        assert!(task.is_due_on(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()));
        assert!(!task.is_due_on(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()));

        let undated = Task {
            due_date: None,
            ..sample_task()
        };
        assert!(!undated.is_due_on(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()));
    }

    #[test]
    fn test_stats_from_tasks() {
        let done = Task {
            status: TaskStatus::Done,
            priority: TaskPriority::Low,
            ..sample_task()
        };
        let tasks = vec![sample_task(), sample_task(), done];

        let stats = TaskStats::from_tasks(&tasks);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.by_status.todo, 2);
        assert_eq!(stats.by_priority.high, 2);
        assert_eq!(stats.by_priority.low, 1);
        assert!((stats.completion_rate - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_empty() {
        let stats = TaskStats::from_tasks(&Vec::<Task>::new());
        assert_eq!(stats, TaskStats::default());
        assert_eq!(stats.completion_rate, 0.0);
    }
}
