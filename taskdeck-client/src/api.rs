/// API seam used by the task store
///
/// [`TaskStore`](crate::store::TaskStore) talks to the server only through
/// [`TaskApi`], so tests can swap in an in-memory implementation.

use async_trait::async_trait;
use taskdeck_shared::models::task::{NewTask, Task, TaskPatch};
use taskdeck_shared::validation::FieldError;

/// Client-side errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// 401: missing, invalid or expired session
    #[error("Unauthorized")]
    Unauthorized,

    /// 400 with the failing fields
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        details: Vec<FieldError>,
    },

    /// 404: the task does not exist or belongs to someone else
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Connection, timeout or body decoding failure
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// Whether the request reached the server and was refused for its content
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// Task operations the store depends on
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// All tasks of the session's user
    async fn list(&self) -> Result<Vec<Task>, ClientError>;

    /// Creates a task and returns the persisted row
    async fn create(&self, task: &NewTask) -> Result<Task, ClientError>;

    /// Applies a partial update and returns the persisted row
    async fn update(&self, id: i32, patch: &TaskPatch) -> Result<Task, ClientError>;

    async fn delete(&self, id: i32) -> Result<(), ClientError>;
}
