//! Top-level client wiring configuration, token manager and services

use std::sync::Arc;

use hsdp_common::auth::{OAuthClient, OAuthConfig, TokenManager};
use hsdp_domain::Service;
use tracing::info;

use crate::api::{ApiClient, ApiError};
use crate::cdr::CdrClient;
use crate::config::{self, ClientConfig};
use crate::iam::ClientsService;
use crate::notification::ProducerService;

/// Token manager backed by the IAM token endpoint
pub type IamTokenManager = TokenManager<OAuthClient>;

/// Entry point: one token manager shared by every service client
#[derive(Debug)]
pub struct HsdpClient {
    config: ClientConfig,
    tokens: Arc<IamTokenManager>,
    api: Arc<ApiClient>,
}

impl HsdpClient {
    /// # Errors
    /// Returns `ApiError::Config` if the configuration is invalid or has no
    /// IAM URL
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let iam_url = config
            .service_url(Service::Iam)
            .ok_or_else(|| ApiError::Config("IAM URL is required for login".into()))?;

        let oauth = OAuthClient::new(
            OAuthConfig::new(iam_url, config.credentials.clone()),
            config.timeout(),
        )
        .map_err(|e| ApiError::Config(format!("OAuth2 client: {e}")))?;
        let tokens = Arc::new(TokenManager::new(oauth, config.refresh_margin_secs));
        let api = Arc::new(ApiClient::new(&config, tokens.clone())?);

        Ok(Self { config, tokens, api })
    }

    /// Build from the environment, falling back to a config file
    ///
    /// # Errors
    /// Returns `ApiError::Config` if no usable configuration is found
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(config::load()?)
    }

    /// Log in with the password grant
    ///
    /// # Errors
    /// Returns `ApiError::Auth` if the identity provider rejects the login
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.tokens.login(username, password).await?;
        info!("logged in with password grant");
        Ok(())
    }

    /// Log in as the OAuth2 client itself
    ///
    /// # Errors
    /// Returns `ApiError::Auth` if the identity provider rejects the login
    pub async fn login_client_credentials(&self) -> Result<(), ApiError> {
        self.tokens.login_client_credentials().await?;
        info!("logged in with client credentials");
        Ok(())
    }

    /// Drop the session tokens
    pub async fn logout(&self) {
        self.tokens.logout().await;
    }

    /// Configuration the client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared token manager
    pub fn token_manager(&self) -> &Arc<IamTokenManager> {
        &self.tokens
    }

    /// Shared API client
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// IAM application clients
    pub fn clients(&self) -> ClientsService {
        ClientsService::new(self.api.clone())
    }

    /// Notification producers
    pub fn producers(&self) -> ProducerService {
        ProducerService::new(self.api.clone())
    }

    /// FHIR store client for the configured root organization
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the CDR URL or root organization id is
    /// not configured
    pub fn cdr(&self) -> Result<CdrClient, ApiError> {
        let root_org_id = self
            .config
            .cdr_root_org_id
            .as_deref()
            .ok_or_else(|| ApiError::Config("CDR root organization id is required".into()))?;
        CdrClient::new(self.api.clone(), root_org_id)
    }
}

#[cfg(test)]
mod tests {
    use hsdp_common::auth::{AuthState, Credentials};
    use url::Url;

    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new(Credentials::new("client", "secret"))
            .with_service_url(Service::Iam, Url::parse("https://iam.example.com").unwrap())
            .with_service_url(Service::Cdr, Url::parse("https://cdr.example.com").unwrap())
    }

    #[tokio::test]
    async fn starts_unauthenticated() {
        let client = HsdpClient::new(config()).unwrap();
        assert_eq!(client.token_manager().state().await, AuthState::Unauthenticated);
        assert_eq!(client.token_manager().refresh_threshold(), 60);
    }

    #[test]
    fn iam_url_required() {
        let config = ClientConfig::new(Credentials::new("client", "secret"));
        assert!(matches!(HsdpClient::new(config), Err(ApiError::Config(_))));
    }

    #[test]
    fn cdr_requires_root_org() {
        let client = HsdpClient::new(config()).unwrap();
        assert!(client.cdr().is_err());

        let client = HsdpClient::new(config().with_cdr_root_org_id("org-1")).unwrap();
        let cdr = client.cdr().unwrap();
        assert_eq!(cdr.endpoint_url().as_str(), "https://cdr.example.com/store/fhir/org-1");
    }
}
