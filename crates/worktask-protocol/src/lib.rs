//! # worktask Protocol Types
//!
//! Wire payload types for the worktask REST API, the application-side
//! entity shapes the UI consumes, and the pure transformers between them.
//!
//! The wire types in [`types`] mirror the server's JSON contract exactly
//! (camelCase field names, optional fields the server may omit). The
//! entity shapes in [`entities`] are what the rest of the application
//! works with; [`transform`] maps between the two so wire-format changes
//! stay contained in this crate.

pub mod entities;
pub mod transform;
pub mod types;

pub use entities::{Project, Task, UserProfile};
pub use transform::{
    DEFAULT_POSITION, project_to_app, projects_to_app, task_to_app, tasks_to_app,
};
pub use types::{
    ApiProject, ApiTask, CreateProjectRequest, LoginRequest, LoginResponse, ParseTaskStatusError,
    RefreshTokenRequest, RefreshTokenResponse, TaskStatus, UpdateTaskStatusRequest,
};
