//! Convenience re-exports for common usage
//!
//! ```rust
//! use worktask_client::prelude::*;
//! ```

pub use crate::client::{WorkTaskClient, WorkTaskClientBuilder};
pub use crate::config::ClientConfig;
pub use crate::error::{ClientResult, WorkTaskError};
pub use crate::gateway::AuthEvent;
pub use crate::services::{DropTarget, TaskFilter, TaskStatusChange};
pub use worktask_protocol::{Project, Task, TaskStatus};
pub use worktask_storage::{KeyValueStorage, StorageScope};
