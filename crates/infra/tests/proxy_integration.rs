//! Proxy environment handling
//!
//! Kept in its own test binary: it sets `HTTP_PROXY` for the whole process.

use std::time::Duration;

use hsdp_common::auth::{Credentials, Grant, OAuthClient, OAuthConfig};
use hsdp_infra::http::HttpClient;
use reqwest::{Method, Request, StatusCode};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Both the service transport and the token client go through the proxy
/// named by `HTTP_PROXY`
#[tokio::test]
async fn test_proxy_environment_is_honored() {
    let proxy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/core/ping"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&proxy)
        .await;
    Mock::given(method("POST"))
        .and(path("/authorize/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"access_token":"proxied","refresh_token":"r","expires_in":1799,"token_type":"Bearer"}"#,
        ))
        .expect(1)
        .mount(&proxy)
        .await;

    for key in ["NO_PROXY", "no_proxy", "ALL_PROXY", "all_proxy"] {
        std::env::remove_var(key);
    }
    std::env::set_var("HTTP_PROXY", proxy.uri());

    let http = HttpClient::new().expect("http client");
    let target = Url::parse("http://hsdp-upstream.invalid/core/ping").expect("url");
    let response = http.send(Request::new(Method::GET, target)).await.expect("proxied send");
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let config = OAuthConfig::new(
        Url::parse("http://iam.invalid").expect("url"),
        Credentials::new("client", "secret"),
    );
    let oauth = OAuthClient::new(config, Duration::from_secs(5)).expect("oauth client");
    let tokens = oauth.exchange(&Grant::ClientCredentials).await.expect("proxied token");
    assert_eq!(tokens.access_token, "proxied");
}
