/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Create an account
/// - `POST /auth/login` - Exchange credentials for a session token
/// - `POST /auth/logout` - Clear the session cookie
/// - `GET  /auth/me` - Profile of the current session's user
///
/// Login returns the token in the body for API clients and also sets it as
/// the `taskdeck_session` cookie for browsers.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, DUPLICATE_EMAIL_MESSAGE},
    routes::MessageResponse,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskdeck_shared::{
    auth::{
        middleware::{Session, SESSION_COOKIE},
        password,
        session::{create_session_token, SessionClaims},
    },
    models::user::{CreateUser, User, UserProfile},
    validation::{validate_login, validate_register},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Session token, also sent as a cookie
    pub token: String,

    pub user: UserProfile,
}

/// Register a new user
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "password": "hunter22"
/// }
/// ```
///
/// Responds with `{ "id": 1, "name": "Ada Lovelace", "email": "ada@example.com" }`.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, or "User already exists"
/// - `500 Internal Server Error`: server error
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<UserProfile>> {
    let Json(body) = body?;
    let req = validate_register(&body)?;

    // The unique constraint still backs this check when two registrations race
    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        tracing::info!("Registration rejected: email already registered");
        return Err(ApiError::BadRequest(DUPLICATE_EMAIL_MESSAGE.to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            name: req.name,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");
    Ok(Json(user.profile()))
}

/// Log in
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "email": "ada@example.com", "password": "hunter22" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `401 Unauthorized`: unknown email or wrong password (same message)
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let req = validate_login(&body)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let session = &state.config.session;
    let token = create_session_token(&SessionClaims::new(user.id, session.ttl()), &session.secret)?;
    let cookie = session_cookie(&token, session.ttl().num_seconds(), state.config.api.production)?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(LoginResponse {
            token,
            user: user.profile(),
        }),
    ))
}

/// Log out
///
/// Sessions are stateless, so this only expires the browser cookie.
pub async fn logout(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let cookie = session_cookie("", 0, state.config.api.production)?;
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(MessageResponse::new("Logged out")),
    ))
}

/// Profile of the current user
///
/// # Errors
///
/// - `401 Unauthorized`: no session, or the session's user no longer exists
pub async fn me(State(state): State<AppState>, session: Session) -> ApiResult<Json<UserProfile>> {
    let user = User::find_by_id(&state.db, session.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    Ok(Json(user.profile()))
}

fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> ApiResult<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalError(format!("Invalid session cookie: {}", e)))
}
