//! Access token seam between the API client and the token manager

use async_trait::async_trait;
use hsdp_common::auth::{OAuthClientTrait, TokenManager};

use super::errors::ApiError;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token, refreshing it first if it is near expiry
    async fn access_token(&self) -> Result<String, ApiError>;

    /// Replace `stale` after the server rejected it
    ///
    /// Concurrent callers holding the same stale token share one refresh.
    async fn refresh_if_current(&self, stale: &str) -> Result<String, ApiError>;
}

#[async_trait]
impl<C> AccessTokenProvider for TokenManager<C>
where
    C: OAuthClientTrait + 'static,
{
    async fn access_token(&self) -> Result<String, ApiError> {
        Ok(TokenManager::access_token(self).await?)
    }

    async fn refresh_if_current(&self, stale: &str) -> Result<String, ApiError> {
        Ok(TokenManager::refresh_if_current(self, stale).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticToken(&'static str);

    #[async_trait]
    impl AccessTokenProvider for StaticToken {
        async fn access_token(&self) -> Result<String, ApiError> {
            Ok(self.0.to_string())
        }

        async fn refresh_if_current(&self, _stale: &str) -> Result<String, ApiError> {
            Err(ApiError::Auth(hsdp_common::auth::TokenManagerError::NoRefreshToken))
        }
    }

    #[tokio::test]
    async fn provider_is_object_safe() {
        let provider: Box<dyn AccessTokenProvider> = Box::new(StaticToken("abc"));
        assert_eq!(provider.access_token().await.unwrap(), "abc");
        assert!(provider.refresh_if_current("abc").await.is_err());
    }
}
