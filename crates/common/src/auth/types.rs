//! OAuth 2.0 types and structures
//!
//! Data structures for tokens, token endpoint responses, client credentials
//! and identity provider configuration.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// OAuth 2.0 access and refresh tokens with metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Bearer token presented on every authenticated request
    pub access_token: String,

    /// Refresh token for obtaining new access tokens
    /// Optional because client-credential grants may not issue one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type (always "Bearer" for this identity provider)
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Absolute expiration timestamp (UTC)
    /// Calculated from expires_in at token creation time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Granted scopes
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenSet {
    /// Create a new `TokenSet` with calculated expiration time
    ///
    /// # Arguments
    /// * `access_token` - The access token
    /// * `refresh_token` - Optional refresh token
    /// * `expires_in` - Token lifetime in seconds
    /// * `scope` - Optional space-separated scopes
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
        scope: Option<&str>,
    ) -> Self {
        let expires_at = if expires_in > 0 {
            Some(Utc::now() + chrono::Duration::seconds(expires_in))
        } else {
            None
        };

        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            expires_at,
            scopes: scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }

    /// Check if the access token is expired or will expire within the given
    /// threshold
    ///
    /// Returns `false` when no expiry is set.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let threshold = chrono::Duration::seconds(threshold_seconds);
                Utc::now() + threshold >= expires_at
            }
            None => false,
        }
    }

    /// Get seconds until token expiration
    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }

    /// Whether `scope` was granted
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        let mut tokens = Self::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            response.scope.as_deref(),
        );
        tokens.token_type = response.token_type;
        tokens
    }
}

/// Token introspection response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntrospectResponse {
    pub active: bool,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub exp: i64,
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub identity_type: String,
    #[serde(default)]
    pub organizations: Option<Organizations>,
}

/// Organization membership reported by introspection
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organizations {
    #[serde(default)]
    pub managing_organization: String,
    #[serde(default)]
    pub organization_list: Vec<OrganizationEntry>,
}

/// Organization membership reported by introspection
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationEntry {
    pub organization_id: String,
    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// OAuth2 client credentials plus optional request signing keys.
///
/// Immutable once the client is built. Secrets are redacted from `Debug`.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    shared_key: Option<String>,
    #[serde(default)]
    secret_key: Option<String>,
}

impl Credentials {
    /// OAuth2 client credentials without signing keys
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            shared_key: None,
            secret_key: None,
        }
    }

    /// Attach the shared/secret signing key pair
    #[must_use]
    pub fn with_signing_keys(
        mut self,
        shared_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.shared_key = Some(shared_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// OAuth2 client identifier
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// OAuth2 client secret
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// API signing shared key, if configured
    pub fn shared_key(&self) -> Option<&str> {
        self.shared_key.as_deref()
    }

    /// API signing secret key, if configured
    pub fn secret_key(&self) -> Option<&str> {
        self.secret_key.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("shared_key", &self.shared_key.as_ref().map(|_| "<redacted>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Identity provider configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// IAM base URL (token and introspection endpoints live below it)
    pub iam_url: Url,

    /// OAuth2 client credentials used for basic auth at the token endpoint
    pub credentials: Credentials,

    /// Scopes requested on login; empty means the provider default
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Create a new OAuth configuration
    #[must_use]
    pub fn new(iam_url: Url, credentials: Credentials) -> Self {
        Self { iam_url: with_trailing_slash(iam_url), credentials, scopes: Vec::new() }
    }

    /// Request explicit scopes on login
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Get the token URL
    pub fn token_url(&self) -> Result<Url, url::ParseError> {
        self.iam_url.join("authorize/oauth2/token")
    }

    /// Get the introspection URL
    pub fn introspect_url(&self) -> Result<Url, url::ParseError> {
        self.iam_url.join("authorize/oauth2/introspect")
    }

    /// Get scopes as space-separated string
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Ensure `url` ends in `/` so that `Url::join` appends instead of replacing
/// the final segment.
#[must_use]
pub fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// OAuth error response from authorization server
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

/// Lifecycle state of the token manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Refreshing,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::Refreshing => "refreshing",
        };
        f.write_str(label)
    }
}
