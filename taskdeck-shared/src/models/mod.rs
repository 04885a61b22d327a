/// Database models for Taskdeck
///
/// Each model owns its SQL. Queries that touch a single row always take the
/// caller's user id and match on `id AND user_id` in one statement.
///
/// - `user`: accounts created at registration
/// - `project`: optional grouping for tasks
/// - `category`: optional label for tasks
/// - `task`: the task itself, plus the derived-view queries (stats, calendar, recent)

pub mod category;
pub mod project;
pub mod task;
pub mod user;
