//! Error types for worktask client operations

use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, WorkTaskError>;

/// Error taxonomy for the session and synchronization layer.
///
/// Variants carry owned data and derive `Clone` so an outcome produced
/// once (a single-flight refresh, a de-duplicated fetch) can be handed
/// to every caller that awaited it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkTaskError {
    /// No access token is stored; raised locally before any network call.
    #[error("unauthorized: no access token")]
    MissingToken,

    /// Refresh could not produce a usable token; terminal for the session.
    #[error("session expired")]
    SessionExpired,

    /// Non-2xx response outside the refresh-and-retry protocol. The body
    /// is kept raw; it is not assumed to be parseable.
    #[error("HTTP error {status}")]
    Http { status: u16, body: Option<String> },

    /// Network-level failure before a status was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// A success response whose body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// Persistence adapter failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Status sync attempted for a task with no discoverable stable code.
    #[error("task code not resolvable for task {0}")]
    TaskCodeUnresolvable(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),
}

impl WorkTaskError {
    /// Create a transport error with a message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a decode error with a message.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create an HTTP error from a response status and raw body.
    pub fn http(status: u16, body: Option<String>) -> Self {
        Self::Http { status, body }
    }

    /// Numeric status when this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this failure ends the authenticated session, requiring the
    /// UI to route to sign-in.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::MissingToken | Self::SessionExpired)
    }

    /// Whether this is a local cache miss rather than a remote failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProjectNotFound(_) | Self::TaskNotFound(_))
    }
}

impl From<reqwest::Error> for WorkTaskError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for WorkTaskError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<worktask_storage::StorageError> for WorkTaskError {
    fn from(error: worktask_storage::StorageError) -> Self {
        Self::Storage(error.to_string())
    }
}
