//! HTTP transport implementation over reqwest

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientResult, WorkTaskError};
use crate::transport::{ApiRequest, ApiResponse, ApiTransport, Method, TransportStatistics};

/// HTTP transport over a pooled reqwest client.
#[derive(Debug)]
pub struct HttpTransport {
    /// HTTP client
    client: Client,
    /// Server origin, scheme-validated at construction
    origin: String,
    /// Statistics
    stats: parking_lot::Mutex<TransportStatistics>,
}

impl HttpTransport {
    /// Create a new HTTP transport for the configured origin.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let url = Url::parse(&config.base_url)
            .map_err(|e| WorkTaskError::transport(format!("invalid base URL: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(WorkTaskError::transport(format!(
                "invalid scheme for HTTP transport: {}",
                url.scheme()
            )));
        }

        let mut builder = Client::builder()
            .connect_timeout(config.timeouts.connect)
            .timeout(config.timeouts.request);
        if let Some(user_agent) = &config.connection.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|e| WorkTaskError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            origin: config.base_url.trim_end_matches('/').to_string(),
            stats: parking_lot::Mutex::new(TransportStatistics::default()),
        })
    }

    /// Update statistics
    fn update_stats<F>(&self, update_fn: F)
    where
        F: FnOnce(&mut TransportStatistics),
    {
        let mut stats = self.stats.lock();
        update_fn(&mut stats);
    }

    fn record_error(&self, error: &WorkTaskError) {
        self.update_stats(|stats| {
            stats.errors += 1;
            stats.last_error = Some(error.to_string());
        });
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        // Plain concatenation, not Url::join: the origin may carry its own
        // path segment that a rooted join would discard.
        let url = format!("{}{}", self.origin, request.path);
        debug!(method = %request.method, url = %url, "sending API request");
        self.update_stats(|stats| stats.requests_sent += 1);

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        builder = builder.header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            let error = WorkTaskError::from(e);
            self.record_error(&error);
            error
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            let error = WorkTaskError::from(e);
            self.record_error(&error);
            error
        })?;

        self.update_stats(|stats| stats.responses_received += 1);
        debug!(status, url = %url, "received API response");
        Ok(ApiResponse { status, body })
    }

    fn endpoint(&self) -> &str {
        &self.origin
    }

    fn statistics(&self) -> TransportStatistics {
        self.stats.lock().clone()
    }
}
