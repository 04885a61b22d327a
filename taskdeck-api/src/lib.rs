//! # Taskdeck API Server Library
//!
//! - `app`: Application state, router builder and the session gate
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Tower middleware
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
