//! # Taskdeck Client
//!
//! Client-side access to the Taskdeck API.
//!
//! - [`api`]: the [`TaskApi`] seam and [`ClientError`]
//! - [`http`]: [`HttpTaskApi`], the `reqwest` implementation
//! - [`store`]: [`TaskStore`], a cached task list with optimistic mutations
//!
//! ```no_run
//! use taskdeck_client::{HttpTaskApi, TaskStore};
//!
//! # async fn demo() -> Result<(), taskdeck_client::ClientError> {
//! let api = HttpTaskApi::new("http://localhost:8080", "session-token");
//! let store = TaskStore::new(api, 1);
//!
//! store.refresh().await?;
//! println!("{} tasks", store.tasks().await.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod http;
pub mod store;

pub use api::{ClientError, TaskApi};
pub use http::HttpTaskApi;
pub use store::{MutationOutcome, MutationPhase, TaskStore};
