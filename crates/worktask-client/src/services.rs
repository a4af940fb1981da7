//! High-level API services
//!
//! The surface the UI layer calls: authentication, project listing and
//! the task cache. Each service goes through the request gateway, which
//! owns authorization and retry policy.

pub mod auth;
pub mod project;
pub mod task;

pub use auth::AuthService;
pub use project::ProjectService;
pub use task::{DropTarget, TaskFilter, TaskService, TaskStatusChange};
