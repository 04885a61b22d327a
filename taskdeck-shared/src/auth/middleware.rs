/// Session resolution for Axum
///
/// [`resolve_session`] turns a request's session token into a [`Session`].
/// The API's gate middleware stores that `Session` in the request
/// extensions, and handlers take it as an extractor. A request that reached
/// a handler without passing the gate is rejected with 401.
///
/// The token is read from `Authorization: Bearer <token>` first and from the
/// `taskdeck_session` cookie otherwise.
///
/// # Example
///
/// ```no_run
/// use axum::{extract::Request, middleware::Next, response::Response};
/// use taskdeck_shared::auth::middleware::{resolve_session, AuthError, Session};
///
/// async fn gate(mut req: Request, next: Next) -> Result<Response, AuthError> {
///     let session = resolve_session(req.headers(), "secret")?;
///     req.extensions_mut().insert(session);
///     Ok(next.run(req).await)
/// }
///
/// async fn handler(session: Session) -> String {
///     format!("Hello, user {}!", session.user_id)
/// }
/// ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::session::{validate_session_token, SessionError};

/// Cookie that carries the session token for browser clients
pub const SESSION_COOKIE: &str = "taskdeck_session";

/// The authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i32,
}

/// Error type for the session gate
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Session has expired")]
    Expired,

    #[error("Invalid session: {0}")]
    InvalidToken(String),
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Expired => AuthError::Expired,
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "Session rejected");

        let body = Json(json!({
            "error": "unauthorized",
            "message": "Unauthorized",
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Pulls the raw session token out of the request headers
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    bearer.or_else(|| {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.trim())
            .filter(|token| !token.is_empty())
    })
}

/// Validates the request's session token and returns the caller
pub fn resolve_session(headers: &HeaderMap, secret: &str) -> Result<Session, AuthError> {
    let token = extract_token(headers).ok_or(AuthError::MissingCredentials)?;
    let claims = validate_session_token(token, secret)?;

    Ok(Session { user_id: claims.sub })
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .copied()
            .ok_or(AuthError::MissingCredentials)
    }
}
