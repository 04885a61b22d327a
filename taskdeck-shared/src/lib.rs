//! # Taskdeck Shared Library
//!
//! This crate contains shared types, utilities, and business logic used across
//! the Taskdeck API server and client.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing, session tokens and the session gate
//! - `db`: Connection pool and migrations
//! - `validation`: Payload validation for task writes

pub mod auth;
pub mod db;
pub mod models;
pub mod validation;

/// Current version of the Taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
