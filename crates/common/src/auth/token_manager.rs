//! Token manager with single-flight refresh
//!
//! Manages the OAuth token lifecycle:
//! - Login via password or client-credentials grant
//! - Transparent refresh before expiry (configurable margin)
//! - Single-flight refresh shared by concurrent callers
//! - Fallback to unauthenticated on irrecoverable refresh failure

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::client::{Grant, OAuthClientError};
use super::traits::OAuthClientTrait;
use super::types::{AuthState, IntrospectResponse, TokenSet};

/// Default refresh margin in seconds
pub const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 60;

/// Error type for token manager operations
#[derive(Debug, Error)]
pub enum TokenManagerError {
    /// No tokens available (not authenticated)
    #[error("Not authenticated (no tokens)")]
    NotAuthenticated,

    /// Login was rejected or failed
    #[error("Login failed: {0}")]
    LoginFailed(#[source] OAuthClientError),

    /// Token refresh failed; the manager is unauthenticated afterwards
    #[error("Token refresh failed: {0}")]
    RefreshFailed(#[source] OAuthClientError),

    /// No refresh token available
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Other OAuth operation failed
    #[error("OAuth error: {0}")]
    OAuthError(#[from] OAuthClientError),
}

#[derive(Debug)]
struct TokenState {
    tokens: Option<TokenSet>,
    state: AuthState,
    /// Client-credential logins can be renewed without a refresh token
    renewable: bool,
}

/// Token manager shared by every request of a client
///
/// Token state sits behind an `RwLock`; refreshes additionally serialize on
/// `refresh_lock` so that concurrent callers observing an expired token wait
/// for a single refresh and reuse its result.
pub struct TokenManager<C: OAuthClientTrait + 'static> {
    oauth_client: Arc<C>,
    inner: RwLock<TokenState>,
    refresh_lock: Mutex<()>,
    refresh_threshold_seconds: i64,
}

impl<C: OAuthClientTrait + 'static> TokenManager<C> {
    /// Create a new token manager
    ///
    /// # Arguments
    /// * `oauth_client` - OAuth client for login and refresh
    /// * `refresh_threshold_seconds` - Refresh tokens this many seconds before
    ///   expiry
    #[must_use]
    pub fn new(oauth_client: C, refresh_threshold_seconds: i64) -> Self {
        Self::with_shared_client(Arc::new(oauth_client), refresh_threshold_seconds)
    }

    /// Create a token manager over an already shared OAuth client
    #[must_use]
    pub fn with_shared_client(oauth_client: Arc<C>, refresh_threshold_seconds: i64) -> Self {
        Self {
            oauth_client,
            inner: RwLock::new(TokenState {
                tokens: None,
                state: AuthState::Unauthenticated,
                renewable: false,
            }),
            refresh_lock: Mutex::new(()),
            refresh_threshold_seconds,
        }
    }

    /// Log in with username and password
    ///
    /// # Errors
    /// Returns `LoginFailed` if the identity provider rejects the credentials
    pub async fn login(&self, username: &str, password: &str) -> Result<(), TokenManagerError> {
        self.login_with(&Grant::password(username, password)).await
    }

    /// Log in with the configured OAuth2 client credentials
    ///
    /// # Errors
    /// Returns `LoginFailed` if the identity provider rejects the credentials
    pub async fn login_client_credentials(&self) -> Result<(), TokenManagerError> {
        self.login_with(&Grant::ClientCredentials).await
    }

    /// Exchange `grant` for tokens and become authenticated
    ///
    /// # Errors
    /// Returns `LoginFailed` on any exchange failure; the manager is left
    /// unauthenticated
    pub async fn login_with(&self, grant: &Grant) -> Result<(), TokenManagerError> {
        let _guard = self.refresh_lock.lock().await;
        self.inner.write().await.state = AuthState::Authenticating;

        match self.oauth_client.exchange(grant).await {
            Ok(tokens) => {
                let mut inner = self.inner.write().await;
                inner.tokens = Some(tokens);
                inner.state = AuthState::Authenticated;
                inner.renewable = matches!(grant, Grant::ClientCredentials);
                info!("login successful");
                Ok(())
            }
            Err(err) => {
                self.reset().await;
                warn!(error = %err, "login failed");
                Err(TokenManagerError::LoginFailed(err))
            }
        }
    }

    /// Install tokens obtained elsewhere
    pub async fn store_tokens(&self, tokens: TokenSet) {
        let mut inner = self.inner.write().await;
        inner.tokens = Some(tokens);
        inner.state = AuthState::Authenticated;
    }

    /// Get current access token, refreshing first if it is expired or near
    /// expiry
    ///
    /// # Errors
    /// Returns error if:
    /// - Not authenticated (no tokens)
    /// - Token refresh fails
    pub async fn access_token(&self) -> Result<String, TokenManagerError> {
        let stale = {
            let inner = self.inner.read().await;
            match inner.tokens.as_ref() {
                None => return Err(TokenManagerError::NotAuthenticated),
                Some(t) if !t.is_expired(self.refresh_threshold_seconds) => {
                    return Ok(t.access_token.clone());
                }
                Some(t) => t.access_token.clone(),
            }
        };

        self.refresh_if_current(&stale).await
    }

    /// Refresh unless another caller already replaced `stale`.
    ///
    /// Used after the server rejected `stale` with a 401: concurrent callers
    /// holding the same rejected token trigger a single refresh.
    ///
    /// # Errors
    /// Returns error if not authenticated or the refresh fails
    pub async fn refresh_if_current(&self, stale: &str) -> Result<String, TokenManagerError> {
        let _guard = self.refresh_lock.lock().await;

        {
            let inner = self.inner.read().await;
            match inner.tokens.as_ref() {
                None => return Err(TokenManagerError::NotAuthenticated),
                // Replaced while waiting for the lock: reuse it even if the
                // new lifetime is inside the refresh margin.
                Some(t) if t.access_token != stale => {
                    debug!("token already refreshed by another caller");
                    return Ok(t.access_token.clone());
                }
                Some(_) => {}
            }
        }

        self.refresh_locked().await
    }

    /// Force a refresh of the current tokens
    ///
    /// # Errors
    /// Returns error if not authenticated or the refresh fails
    pub async fn refresh(&self) -> Result<(), TokenManagerError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await.map(|_| ())
    }

    /// Caller must hold `refresh_lock`.
    async fn refresh_locked(&self) -> Result<String, TokenManagerError> {
        let (refresh_token, renewable) = {
            let mut inner = self.inner.write().await;
            let Some(tokens) = inner.tokens.as_ref() else {
                return Err(TokenManagerError::NotAuthenticated);
            };
            let refresh_token = tokens.refresh_token.clone().filter(|t| !t.is_empty());
            let renewable = inner.renewable;
            inner.state = AuthState::Refreshing;
            (refresh_token, renewable)
        };

        let result = match (refresh_token, renewable) {
            (Some(token), _) => self.oauth_client.refresh_access_token(&token).await,
            (None, true) => self.oauth_client.exchange(&Grant::ClientCredentials).await,
            (None, false) => {
                self.reset().await;
                return Err(TokenManagerError::NoRefreshToken);
            }
        };

        match result {
            Ok(tokens) => {
                let access_token = tokens.access_token.clone();
                let mut inner = self.inner.write().await;
                inner.tokens = Some(tokens);
                inner.state = AuthState::Authenticated;
                info!("access token refreshed");
                Ok(access_token)
            }
            Err(err) => {
                self.reset().await;
                warn!(error = %err, "token refresh failed, session dropped");
                Err(TokenManagerError::RefreshFailed(err))
            }
        }
    }

    async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.tokens = None;
        inner.state = AuthState::Unauthenticated;
        inner.renewable = false;
    }

    /// Drop local tokens
    pub async fn logout(&self) {
        let _guard = self.refresh_lock.lock().await;
        self.reset().await;
        info!("tokens cleared (logged out)");
    }

    /// Introspect the current access token
    ///
    /// # Errors
    /// Returns error if not authenticated or introspection fails
    pub async fn introspect(&self) -> Result<IntrospectResponse, TokenManagerError> {
        let token = self.access_token().await?;
        Ok(self.oauth_client.introspect(&token).await?)
    }

    /// Get current token set (without auto-refresh)
    pub async fn get_tokens(&self) -> Option<TokenSet> {
        self.inner.read().await.tokens.clone()
    }

    /// Current lifecycle state
    pub async fn state(&self) -> AuthState {
        self.inner.read().await.state
    }

    /// Check if tokens are held
    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.tokens.is_some()
    }

    /// Whether the held access token is usable without a refresh
    pub async fn is_token_valid(&self) -> bool {
        self.inner
            .read()
            .await
            .tokens
            .as_ref()
            .is_some_and(|t| !t.is_expired(self.refresh_threshold_seconds))
    }

    /// Get seconds until token expiry
    pub async fn seconds_until_expiry(&self) -> Option<i64> {
        self.inner.read().await.tokens.as_ref().and_then(TokenSet::seconds_until_expiry)
    }

    /// Get the refresh threshold in seconds
    #[must_use]
    pub fn refresh_threshold(&self) -> i64 {
        self.refresh_threshold_seconds
    }
}

impl<C: OAuthClientTrait + 'static> std::fmt::Debug for TokenManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("refresh_threshold_seconds", &self.refresh_threshold_seconds)
            .finish_non_exhaustive()
    }
}
