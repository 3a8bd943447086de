//! Authenticated API client
//!
//! Sends [`ApiRequest`]s against the configured service base URLs with a
//! bearer token from an [`AccessTokenProvider`]. A 401 triggers one token
//! refresh and one resend; nothing else is retried.

use std::collections::HashMap;
use std::sync::Arc;

use hsdp_domain::Service;
use reqwest::StatusCode;
use tracing::{debug, info, instrument};
use url::Url;

use super::auth::AccessTokenProvider;
use super::errors::ApiError;
use crate::config::ClientConfig;
use crate::http::{ApiRequest, HttpClient, RawResponse};

/// API client shared by the service clients
pub struct ApiClient {
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    bases: HashMap<Service, Url>,
}

impl ApiClient {
    /// Create a client for every service configured in `config`
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the configuration is invalid or the
    /// HTTP client cannot be built
    pub fn new(
        config: &ClientConfig,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ApiError> {
        config.validate()?;
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_http(config, http, auth))
    }

    fn with_http(
        config: &ClientConfig,
        http: HttpClient,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        let bases = Service::ALL
            .into_iter()
            .filter_map(|service| config.service_url(service).map(|url| (service, url)))
            .collect();
        Self { http, auth, bases }
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Base URL of `service`
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the service has no configured URL
    pub fn base_url(&self, service: Service) -> Result<&Url, ApiError> {
        self.bases
            .get(&service)
            .ok_or_else(|| ApiError::Config(format!("no base URL configured for {service}")))
    }

    /// Token provider used for every request
    pub fn auth(&self) -> &Arc<dyn AccessTokenProvider> {
        &self.auth
    }

    /// Send `request` and classify the response status
    ///
    /// # Errors
    /// Returns `ApiError::Status` for a non-success status, plus any error
    /// of [`ApiClient::send`]
    pub async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        self.send(request).await?.check()
    }

    /// Send `request` without classifying the final status
    ///
    /// On a 401 the token is refreshed once and the request rebuilt and
    /// resent; the second response is returned as is.
    ///
    /// # Errors
    /// Returns `ApiError::Build`, `ApiError::Auth`, `ApiError::Config` or a
    /// transport error; no request is sent for the first three
    #[instrument(
        skip(self, request),
        fields(service = %request.service(), method = %request.method(), path = request.path())
    )]
    pub async fn send(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        let base = self.base_url(request.service())?;

        // Build once before touching the token so invalid paths fail first
        request.url(base)?;

        let token = self.auth.access_token().await?;
        let response = self.http.send(request.build(base, &token)?).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        info!("request unauthorized, refreshing token and retrying once");
        let fresh = self.auth.refresh_if_current(&token).await?;
        let retried = self.http.send(request.build(base, &fresh)?).await?;
        debug!(status = %retried.status, "retried after refresh");
        Ok(retried)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("http", &self.http)
            .field("services", &self.bases.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
    http: Option<HttpClient>,
}

impl ApiClientBuilder {
    /// Set the client configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the authentication provider
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Use a preconfigured transport instead of one built from the config
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing or client creation fails
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config =
            self.config.ok_or_else(|| ApiError::Config("client configuration not set".into()))?;
        let auth = self.auth.ok_or_else(|| ApiError::Config("Auth provider not set".into()))?;

        match self.http {
            Some(http) => {
                config.validate()?;
                Ok(ApiClient::with_http(&config, http, auth))
            }
            None => ApiClient::new(&config, auth),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use hsdp_common::auth::Credentials;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// Hands out `initial` until refreshed, then `refreshed`
    struct MockAuthProvider {
        initial: String,
        refreshed: String,
        refreshes: AtomicUsize,
    }

    impl MockAuthProvider {
        fn new(initial: &str, refreshed: &str) -> Arc<Self> {
            Arc::new(Self {
                initial: initial.into(),
                refreshed: refreshed.into(),
                refreshes: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AccessTokenProvider for MockAuthProvider {
        async fn access_token(&self) -> Result<String, ApiError> {
            if self.refreshes.load(Ordering::SeqCst) == 0 {
                Ok(self.initial.clone())
            } else {
                Ok(self.refreshed.clone())
            }
        }

        async fn refresh_if_current(&self, _stale: &str) -> Result<String, ApiError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(self.refreshed.clone())
        }
    }

    fn config(server: &MockServer) -> ClientConfig {
        ClientConfig::new(Credentials::new("client", "secret"))
            .with_service_url(Service::Idm, Url::parse(&server.uri()).unwrap())
    }

    fn client(server: &MockServer, auth: Arc<MockAuthProvider>) -> ApiClient {
        ApiClient::builder().config(config(server)).auth(auth).build().unwrap()
    }

    #[tokio::test]
    async fn test_execute_sends_bearer_and_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authorize/identity/Client"))
            .and(header("authorization", "Bearer tok-1"))
            .and(header("api-version", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"total":0}"#))
            .expect(1)
            .mount(&server)
            .await;

        let api = client(&server, MockAuthProvider::new("tok-1", "tok-2"));
        let request = ApiRequest::get(Service::Idm, "authorize/identity/Client").api_version("1");
        let response = api.execute(&request).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unauthorized_refreshes_and_retries_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let auth = MockAuthProvider::new("stale", "fresh");
        let api = client(&server, auth.clone());
        let response = api.execute(&ApiRequest::get(Service::Idm, "things")).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(auth.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_unauthorized_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
            .expect(2)
            .mount(&server)
            .await;

        let auth = MockAuthProvider::new("a", "b");
        let api = client(&server, auth.clone());
        let err = api.execute(&ApiRequest::get(Service::Idm, "things")).await.unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(auth.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_service_is_config_error() {
        let server = MockServer::start().await;
        let api = client(&server, MockAuthProvider::new("a", "b"));
        let err = api.execute(&ApiRequest::get(Service::Cdr, "Patient")).await.unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[tokio::test]
    async fn test_invalid_path_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let api = client(&server, MockAuthProvider::new("a", "b"));
        let err = api
            .execute(&ApiRequest::delete(Service::Idm, "authorize/identity/Client/"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Build(_)));
    }

    #[tokio::test]
    async fn test_builder_missing_auth() {
        let result = ApiClient::builder()
            .config(ClientConfig::new(Credentials::new("client", "secret")))
            .build();
        assert!(matches!(result, Err(ApiError::Config(_))));
    }
}
