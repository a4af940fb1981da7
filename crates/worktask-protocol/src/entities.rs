//! Application-side entity shapes
//!
//! These are the records the UI layer renders and edits. They are produced
//! from wire types by [`crate::transform`] and persisted locally in wire
//! form, so they never appear in network payloads themselves.

use serde::{Deserialize, Serialize};

use crate::types::TaskStatus;

/// A task as the application sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub assignee_id: Option<String>,
    pub project_id: String,
    pub position: i64,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Stable key for status updates; tasks without one cannot be synced.
    #[serde(default)]
    pub code: Option<String>,
}

/// A project as the application sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Profile record captured at login.
///
/// The API exposes no profile endpoint, so this is whatever was known at
/// sign-in time, with placeholder defaults otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl UserProfile {
    /// Fallback profile when no record was stored.
    pub fn placeholder() -> Self {
        Self {
            id: "temp-user-id".to_string(),
            name: "User".to_string(),
            email: "user@example.com".to_string(),
            created_at: None,
        }
    }
}
