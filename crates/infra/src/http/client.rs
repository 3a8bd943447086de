use std::time::Duration;

use reqwest::{Client as ReqwestClient, Request};
use tracing::debug;

use super::response::RawResponse;
use crate::api::ApiError;

/// HTTP transport with a per-call timeout.
///
/// Each call sends exactly one request and reads the full body; there is no
/// transport-level retry.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the TLS backend cannot be initialized
    pub fn new() -> Result<Self, ApiError> {
        Self::builder().build()
    }

    /// Send `request` and read the whole response.
    ///
    /// # Errors
    /// Returns `ApiError::Timeout` when the call exceeds the configured
    /// timeout and `ApiError::Transport` for connection or body read failures.
    pub async fn send(&self, request: Request) -> Result<RawResponse, ApiError> {
        let method = request.method().clone();
        let target = request.url().to_string();
        debug!(%method, url = %target, "sending HTTP request");

        let exchange = async {
            let response = self.client.execute(request).await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, headers, body.to_vec()))
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok((status, headers, body))) => {
                debug!(%method, url = %target, %status, bytes = body.len(), "received HTTP response");
                Ok(RawResponse { status, headers, body, method, target })
            }
            Ok(Err(err)) if err.is_timeout() => {
                debug!(%method, url = %target, "HTTP request timed out");
                Err(ApiError::Timeout { method, target })
            }
            Ok(Err(err)) => {
                debug!(%method, url = %target, error = %err, "HTTP request failed");
                Err(ApiError::Transport { method, target, message: err.to_string() })
            }
            Err(_) => {
                debug!(%method, url = %target, "HTTP request timed out");
                Err(ApiError::Timeout { method, target })
            }
        }
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None, default_headers: None }
    }
}

impl HttpClientBuilder {
    /// Per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `User-Agent` header value
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Headers sent with every request
    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Build the client; proxies come from the `HTTP(S)_PROXY` environment
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the reqwest client cannot be built
    pub fn build(self) -> Result<HttpClient, ApiError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout);

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client =
            builder.build().map_err(|err| ApiError::Config(format!("HTTP client: {err}")))?;

        Ok(HttpClient { client, timeout: self.timeout })
    }
}
