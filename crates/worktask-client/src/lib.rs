//! # worktask Client
//!
//! Session and data-synchronization layer for the worktask task-tracking
//! API. The crate keeps an authenticated session alive against the
//! remote API, mirrors projects and tasks into injected local storage
//! for offline-style reads, and resolves the races between concurrent UI
//! actions and background token renewal.
//!
//! ## Features
//!
//! - **Single-flight token refresh**: any number of calls failing with a
//!   401 trigger at most one refresh; every caller shares its outcome
//! - **One transparent retry**: a failed call is reissued exactly once
//!   after a successful refresh, then the outcome is final
//! - **Request de-duplication**: concurrent identical list fetches
//!   collapse into one network call, with nothing cached once settled
//! - **Optimistic task cache**: drag-and-drop reorders apply locally and
//!   immediately; only genuine status changes are synchronized
//! - **Injected persistence**: tokens and cached entities live behind the
//!   [`worktask_storage::KeyValueStorage`] trait, not ambient globals
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use worktask_client::{ClientConfig, TaskFilter, WorkTaskClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WorkTaskClient::builder()
//!         .with_config(ClientConfig::from_env())
//!         .build()?;
//!
//!     client.auth().login("ada", "secret").await?;
//!
//!     let projects = client.projects().user_projects().await?;
//!     let tasks = client
//!         .tasks()
//!         .activate_project(&projects[0].id)
//!         .await?;
//!     println!("{} tasks on the board", tasks.len());
//!
//!     let cached = client
//!         .tasks()
//!         .tasks(&projects[0].id, &TaskFilter::default())
//!         .await?;
//!     println!("{} tasks cached locally", cached.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Session events
//!
//! When a refresh fails terminally the gateway clears the token pair and
//! pushes [`AuthEvent::SessionExpired`] on the event channel; take the
//! receiver with [`WorkTaskClient::take_auth_events`] and route the user
//! to sign-in.

pub mod client;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod gateway;
pub mod prelude;
pub mod services;
pub mod token;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use client::{WorkTaskClient, WorkTaskClientBuilder};
pub use config::{ClientConfig, ConnectionConfig, TimeoutConfig, TokenConfig};
pub use dedupe::{RequestDeduper, fingerprint};
pub use error::{ClientResult, WorkTaskError};
pub use gateway::{AuthEvent, AuthEventReceiver, RequestGateway};
pub use services::{
    AuthService, DropTarget, ProjectService, TaskFilter, TaskService, TaskStatusChange,
};
pub use token::TokenManager;

// Re-export transport types
pub use transport::{ApiTransport, HttpTransport, Method, SharedTransport};

// Re-export protocol and storage types for convenience
pub use worktask_protocol::*;
pub use worktask_storage::{InMemoryStorage, KeyValueStorage, StorageError, StorageScope};
