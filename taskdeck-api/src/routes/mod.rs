/// API route handlers, organized by resource
///
/// - `health`: health check
/// - `auth`: register, login, logout, current user
/// - `tasks`: task CRUD plus the stats, calendar and recent views
/// - `projects`: project list/create/delete
/// - `categories`: category list/create/delete

pub mod auth;
pub mod categories;
pub mod health;
pub mod projects;
pub mod tasks;

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};

/// `{"message": "..."}` body returned by deletes
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parses a path id; anything that is not a positive integer cannot name a
/// row, so it is reported as `NotFound` with the caller's message
pub(crate) fn parse_id(raw: &str, not_found: &str) -> ApiResult<i32> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::NotFound(not_found.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "Task not found").unwrap(), 42);

        for raw in ["abc", "", "-3", "0", "1.5", "99999999999"] {
            match parse_id(raw, "Task not found") {
                Err(ApiError::NotFound(msg)) => assert_eq!(msg, "Task not found"),
                other => panic!("expected NotFound for {:?}, got {:?}", raw, other),
            }
        }
    }
}
