/// HTTP implementation of [`TaskApi`]
///
/// Sends the session token as a bearer header and maps error statuses onto
/// [`ClientError`]:
///
/// | Status | Error |
/// |---|---|
/// | 401 | `Unauthorized` |
/// | 400 | `Validation` with the field details |
/// | 404 | `NotFound` |
/// | other | `Server` |
///
/// Connection failures and undecodable bodies are `Transport`.

use crate::api::{ClientError, TaskApi};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use taskdeck_shared::models::task::{NewTask, Task, TaskPatch};
use taskdeck_shared::validation::FieldError;

/// `reqwest`-backed task API
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpTaskApi {
    /// Creates a client for `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, token)
    }

    /// Same as [`HttpTaskApi::new`] with a preconfigured `reqwest::Client`
    pub fn with_client(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            base_url,
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request.bearer_auth(&self.token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<ErrorBody>().await.ok();
        let error = error_for_status(status.as_u16(), body);
        tracing::debug!(status = status.as_u16(), error = %error, "Request rejected");

        Err(error)
    }
}

/// Error body produced by the API
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,

    #[serde(default)]
    details: Vec<FieldError>,
}

fn error_for_status(status: u16, body: Option<ErrorBody>) -> ClientError {
    let body = body.unwrap_or_default();

    match status {
        401 => ClientError::Unauthorized,
        400 => ClientError::Validation {
            message: body.message,
            details: body.details,
        },
        404 => ClientError::NotFound(body.message),
        _ => ClientError::Server {
            status,
            message: body.message,
        },
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        let response = self.send(self.client.get(self.url("/tasks"))).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, task: &NewTask) -> Result<Task, ClientError> {
        // The server requires status and priority on create
        let body = task.with_defaults();
        let response = self
            .send(self.client.post(self.url("/tasks")).json(&body))
            .await?;

        Ok(response.json().await?)
    }

    async fn update(&self, id: i32, patch: &TaskPatch) -> Result<Task, ClientError> {
        let response = self
            .send(self.client.put(self.url(&format!("/tasks/{}", id))).json(patch))
            .await?;

        Ok(response.json().await?)
    }

    async fn delete(&self, id: i32) -> Result<(), ClientError> {
        self.send(self.client.delete(self.url(&format!("/tasks/{}", id))))
            .await?;
        Ok(())
    }
}
