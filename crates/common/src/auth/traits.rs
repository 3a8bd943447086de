//! Traits for OAuth operations
//!
//! Abstracts the identity provider so the token manager can be exercised
//! against mock implementations.

use async_trait::async_trait;

use super::client::{Grant, OAuthClientError};
use super::types::{IntrospectResponse, TokenSet};

/// Trait for OAuth client operations
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Exchange a password or client-credentials grant for tokens
    ///
    /// # Errors
    /// Returns error if the provider rejects the grant or the response cannot
    /// be parsed
    async fn exchange(&self, grant: &Grant) -> Result<TokenSet, OAuthClientError>;

    /// Refresh access token using refresh token
    ///
    /// # Errors
    /// Returns error if refresh fails or token is invalid/revoked
    async fn refresh_access_token(&self, refresh_token: &str)
        -> Result<TokenSet, OAuthClientError>;

    /// Introspect an access token
    ///
    /// # Errors
    /// Returns error if the request fails
    async fn introspect(&self, access_token: &str)
        -> Result<IntrospectResponse, OAuthClientError>;
}
