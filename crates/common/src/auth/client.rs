//! OAuth 2.0 client for the IAM token endpoint
//!
//! Handles:
//! - Resource-owner password login
//! - Client-credentials login
//! - Token refresh
//! - Token introspection

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::traits::OAuthClientTrait;
use super::types::{IntrospectResponse, OAuthConfig, OAuthError, TokenResponse, TokenSet};

/// `api-version` sent to the token endpoint
pub const TOKEN_API_VERSION: &str = "2";
/// `api-version` sent to the introspection endpoint
pub const INTROSPECT_API_VERSION: &str = "4";

/// Error type for OAuth client operations
#[derive(Debug, Error)]
pub enum OAuthClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Identity provider rejected the grant with a structured error
    #[error("OAuth error: {0}")]
    OAuthError(OAuthError),

    /// Identity provider returned a non-success status without an OAuth body
    #[error("token endpoint returned status {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    /// Failed to parse response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No refresh token available
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Grant exchanged at the token endpoint
#[derive(Clone)]
pub enum Grant {
    /// Resource-owner password credentials
    Password { username: String, password: String },
    /// Client credentials of the configured OAuth2 client
    ClientCredentials,
}

impl Grant {
    /// Resource-owner password grant
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password { username: username.into(), password: password.into() }
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Password { username, password } => vec![
                ("grant_type", "password".to_string()),
                ("username", username.clone()),
                ("password", password.clone()),
            ],
            Self::ClientCredentials => vec![("grant_type", "client_credentials".to_string())],
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::ClientCredentials => "client_credentials",
        }
    }
}

impl fmt::Debug for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::ClientCredentials => f.write_str("ClientCredentials"),
        }
    }
}

/// OAuth 2.0 client bound to one identity provider
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    client: Client,
}

impl OAuthClient {
    /// Create a new OAuth client with the given configuration
    ///
    /// # Errors
    /// Returns `ConfigError` if the HTTP client cannot be built
    pub fn new(config: OAuthConfig, timeout: Duration) -> Result<Self, OAuthClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OAuthClientError::ConfigError(format!("HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Exchange a grant for tokens
    ///
    /// # Errors
    /// Returns error if the request fails, the provider rejects the grant, or
    /// the response cannot be parsed
    pub async fn exchange(&self, grant: &Grant) -> Result<TokenSet, OAuthClientError> {
        let mut form = grant.form();
        if !self.config.scopes.is_empty() {
            form.push(("scope", self.config.scope_string()));
        }

        debug!(grant = grant.name(), "requesting token");
        self.token_request(&form).await
    }

    /// Refresh access token using refresh token
    ///
    /// # Errors
    /// Returns error if the refresh token is empty or the provider rejects it
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.to_string()),
        ];

        debug!("refreshing token");
        self.token_request(&form).await
    }

    /// Introspect an access token
    ///
    /// # Errors
    /// Returns error if the request fails or the response cannot be parsed
    pub async fn introspect(
        &self,
        access_token: &str,
    ) -> Result<IntrospectResponse, OAuthClientError> {
        let url = endpoint(self.config.introspect_url())?;
        let response = self
            .client
            .post(url)
            .basic_auth(
                self.config.credentials.client_id(),
                Some(self.config.credentials.client_secret()),
            )
            .header("api-version", INTROSPECT_API_VERSION)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .form(&[("token", access_token)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(rejection(status, body));
        }

        serde_json::from_str(&body).map_err(|e| OAuthClientError::ParseError(e.to_string()))
    }

    async fn token_request(
        &self,
        form: &[(&'static str, String)],
    ) -> Result<TokenSet, OAuthClientError> {
        let url = endpoint(self.config.token_url())?;
        let response = self
            .client
            .post(url)
            .basic_auth(
                self.config.credentials.client_id(),
                Some(self.config.credentials.client_secret()),
            )
            .header("api-version", TOKEN_API_VERSION)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(rejection(status, body));
        }

        let token_response: TokenResponse =
            serde_json::from_str(&body).map_err(|e| OAuthClientError::ParseError(e.to_string()))?;
        if token_response.access_token.is_empty() {
            return Err(OAuthClientError::ParseError("empty access_token".to_string()));
        }

        Ok(token_response.into())
    }

    /// Get a reference to the OAuth configuration
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }
}

fn endpoint(url: Result<Url, url::ParseError>) -> Result<Url, OAuthClientError> {
    url.map_err(|e| OAuthClientError::ConfigError(format!("invalid IAM URL: {e}")))
}

fn rejection(status: StatusCode, body: String) -> OAuthClientError {
    match serde_json::from_str::<OAuthError>(&body) {
        Ok(error) => OAuthClientError::OAuthError(error),
        Err(_) => OAuthClientError::Rejected { status, body },
    }
}

#[async_trait]
impl OAuthClientTrait for OAuthClient {
    async fn exchange(&self, grant: &Grant) -> Result<TokenSet, OAuthClientError> {
        self.exchange(grant).await
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, OAuthClientError> {
        self.refresh_access_token(refresh_token).await
    }

    async fn introspect(
        &self,
        access_token: &str,
    ) -> Result<IntrospectResponse, OAuthClientError> {
        self.introspect(access_token).await
    }
}
