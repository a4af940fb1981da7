//! Transport layer for the worktask client

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::ClientResult;

pub mod http;

pub use http::HttpTransport;

/// HTTP method of an outbound API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// A single outbound API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the server origin, versioned prefix included.
    pub path: String,
    /// Bearer token for the `Authorization` header, when required.
    pub bearer: Option<String>,
    /// JSON request body.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Create a request without bearer token or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    /// Attach a bearer token.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status and raw body of a completed call.
///
/// The body stays unparsed here: non-success responses are not assumed to
/// carry the success payload shape, so decoding happens above the
/// transport once the status has been inspected.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport statistics for monitoring
#[derive(Debug, Clone, Default)]
pub struct TransportStatistics {
    /// Number of requests sent
    pub requests_sent: u64,
    /// Number of responses received
    pub responses_received: u64,
    /// Number of transport-level errors encountered
    pub errors: u64,
    /// Last error message
    pub last_error: Option<String>,
}

/// Boundary between the request gateway and the network.
///
/// `execute` takes `&self`: the refresh coordinator and overlapping UI
/// calls share one transport with several calls in flight at once.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Issue one call and return its status and raw body. Non-2xx
    /// statuses are returned, not raised; only transport-level failures
    /// are errors.
    async fn execute(&self, request: ApiRequest) -> ClientResult<ApiResponse>;

    /// Server origin, for diagnostics.
    fn endpoint(&self) -> &str;

    /// Transport statistics.
    fn statistics(&self) -> TransportStatistics {
        TransportStatistics::default()
    }
}

/// Type alias for a shared transport handle
pub type SharedTransport = Arc<dyn ApiTransport>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_display_matches_wire_form() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Put.to_string(), "PUT");
    }

    #[test]
    fn request_builders_compose() {
        let request = ApiRequest::new(Method::Post, "/work-task/v1/auth/login")
            .with_body(serde_json::json!({ "username": "ada" }));
        assert_eq!(request.path, "/work-task/v1/auth/login");
        assert!(request.bearer.is_none());
        assert!(request.body.is_some());
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(ApiResponse { status: 200, body: String::new() }.is_success());
        assert!(ApiResponse { status: 204, body: String::new() }.is_success());
        assert!(!ApiResponse { status: 301, body: String::new() }.is_success());
        assert!(!ApiResponse { status: 401, body: String::new() }.is_success());
    }
}
