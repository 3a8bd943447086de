#![allow(dead_code)]

use std::sync::Once;

use hsdp_common::auth::Credentials;
use hsdp_common::observability::{init_tracing, LogFormat};
use hsdp_domain::Service;
use hsdp_infra::{ClientConfig, HsdpClient};
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ROOT_ORG_ID: &str = "48a0183d-a588-41c2-9979-737d15e9e860";

static TRACING: Once = Once::new();

/// Route test logs through the shared subscriber once per binary
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = init_tracing(LogFormat::Pretty);
    });
}

pub fn token_body(access: &str, expires_in: i64) -> Value {
    json!({
        "access_token": access,
        "refresh_token": format!("refresh-{access}"),
        "expires_in": expires_in,
        "token_type": "Bearer",
        "scope": "mail tdr.contract tdr.dataitem"
    })
}

/// One mock server playing every service, and a client pointed at it
pub struct TestServices {
    pub server: MockServer,
    pub client: HsdpClient,
}

impl TestServices {
    /// Start the mock server and build an unauthenticated client
    pub async fn start() -> Self {
        init_test_tracing();
        let server = MockServer::start().await;
        let base = Url::parse(&server.uri()).expect("mock server uri");

        let mut config = ClientConfig::new(Credentials::new("TestClient", "Secret"))
            .with_cdr_root_org_id(ROOT_ORG_ID);
        for service in Service::ALL {
            config = config.with_service_url(service, base.clone());
        }

        let client = HsdpClient::new(config).expect("client should build");
        Self { server, client }
    }

    /// Start, mount a password-grant token endpoint and log in
    pub async fn logged_in() -> Self {
        let services = Self::start().await;
        Mock::given(method("POST"))
            .and(path("/authorize/oauth2/token"))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-1", 1799)))
            .mount(&services.server)
            .await;

        services.client.login("ronswanson", "password").await.expect("login should succeed");
        services
    }

    /// Bodies of every received request matching `verb` and `request_path`
    pub async fn bodies(&self, verb: &str, request_path: &str) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.method.as_str() == verb && r.url.path() == request_path)
            .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
            .collect()
    }
}
