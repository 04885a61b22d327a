/// Middleware for the API server
///
/// - `security`: hardening headers on every response
///
/// The session gate lives in `app` because it needs `AppState`.

pub mod security;
