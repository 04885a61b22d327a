/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::{build_router, AppState}, config::Config};
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig::new(config.database.url.clone())).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::auth::middleware::resolve_session;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Secret used to sign and verify session tokens
    pub fn session_secret(&self) -> &str {
        &self.config.session.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /health
/// ├── /auth
/// │   ├── POST /register
/// │   ├── POST /login
/// │   ├── POST /logout
/// │   └── GET  /me              (session)
/// ├── /tasks                    (session)
/// │   ├── GET    /
/// │   ├── POST   /
/// │   ├── GET    /stats
/// │   ├── GET    /calendar?date=&priority=
/// │   ├── GET    /recent
/// │   ├── PUT    /:id
/// │   └── DELETE /:id
/// ├── /projects                 (session)
/// │   ├── GET | POST /
/// │   └── DELETE /:id
/// └── /categories               (session)
///     ├── GET | POST /
///     └── DELETE /:id
/// ```
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/logout", post(routes::auth::logout));

    let session_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/tasks", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route("/tasks/stats", get(routes::tasks::task_stats))
        .route("/tasks/calendar", get(routes::tasks::tasks_due_on))
        .route("/tasks/recent", get(routes::tasks::recent_tasks))
        .route("/tasks/:id", put(routes::tasks::update_task).delete(routes::tasks::delete_task))
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route("/projects/:id", delete(routes::projects::delete_project))
        .route(
            "/categories",
            get(routes::categories::list_categories).post(routes::categories::create_category),
        )
        .route("/categories/:id", delete(routes::categories::delete_category))
        .route_layer(from_fn_with_state(state.clone(), session_gate));

    let cors = if state.config.cors_permissive() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Session gate
///
/// Resolves the caller from the bearer token or session cookie and inserts a
/// `Session` into the request extensions. Anything else is a 401 with no
/// side effect.
pub async fn session_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = resolve_session(req.headers(), state.session_secret())?;
    tracing::debug!(user_id = session.user_id, "Session resolved");

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
