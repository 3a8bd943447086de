//! Client configuration
//!
//! Built once and never mutated: base URL per logical service, OAuth2
//! credentials and transport settings.

use std::time::Duration;

use hsdp_common::auth::{with_trailing_slash, Credentials};
use hsdp_domain::constants::{
    DEFAULT_REFRESH_MARGIN_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use hsdp_domain::Service;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::api::ApiError;

/// Configuration shared by every service of one client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Identity provider base URL (token and introspection endpoints)
    #[serde(default)]
    pub iam_url: Option<Url>,
    /// Identity resources base URL (application clients)
    #[serde(default)]
    pub idm_url: Option<Url>,
    #[serde(default)]
    pub notification_url: Option<Url>,
    #[serde(default)]
    pub cdr_url: Option<Url>,
    /// Tenant root organization for the FHIR store endpoint
    #[serde(default)]
    pub cdr_root_org_id: Option<String>,

    pub credentials: Credentials,

    /// Per-request timeout; read from `timeout_secs`, fractions allowed
    #[serde(rename = "timeout_secs", default = "default_timeout", deserialize_with = "secs")]
    pub timeout: Duration,
    /// Refresh tokens this many seconds before expiry
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: i64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}

fn secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}

fn default_refresh_margin_secs() -> i64 {
    DEFAULT_REFRESH_MARGIN_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ClientConfig {
    /// Configuration with credentials only; set service URLs with the
    /// `with_*` methods
    pub fn new(credentials: Credentials) -> Self {
        Self {
            iam_url: None,
            idm_url: None,
            notification_url: None,
            cdr_url: None,
            cdr_root_org_id: None,
            credentials,
            timeout: default_timeout(),
            refresh_margin_secs: DEFAULT_REFRESH_MARGIN_SECS,
            user_agent: default_user_agent(),
        }
    }

    /// Set the base URL of `service`
    pub fn with_service_url(mut self, service: Service, url: Url) -> Self {
        let slot = match service {
            Service::Iam => &mut self.iam_url,
            Service::Idm => &mut self.idm_url,
            Service::Notification => &mut self.notification_url,
            Service::Cdr => &mut self.cdr_url,
        };
        *slot = Some(url);
        self
    }

    /// Root organization of the CDR tenant
    pub fn with_cdr_root_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.cdr_root_org_id = Some(org_id.into());
        self
    }

    /// Per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Refresh tokens this many seconds before expiry
    pub fn with_refresh_margin_secs(mut self, secs: i64) -> Self {
        self.refresh_margin_secs = secs;
        self
    }

    /// Base URL of `service`, normalized to end in `/`
    pub fn service_url(&self, service: Service) -> Option<Url> {
        let url = match service {
            Service::Iam => self.iam_url.as_ref(),
            Service::Idm => self.idm_url.as_ref(),
            Service::Notification => self.notification_url.as_ref(),
            Service::Cdr => self.cdr_url.as_ref(),
        };
        url.cloned().map(with_trailing_slash)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check the configuration before any client is built
    ///
    /// # Errors
    /// Returns `ApiError::Config` if:
    /// - The OAuth2 client id or secret is empty
    /// - A service URL is not http(s) or cannot carry a path
    /// - The timeout is zero or the refresh margin negative
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.credentials.client_id().is_empty() || self.credentials.client_secret().is_empty()
        {
            return Err(ApiError::Config("OAuth2 client id and secret are required".into()));
        }

        for service in Service::ALL {
            if let Some(url) = self.service_url(service) {
                if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
                    return Err(ApiError::Config(format!("invalid {service} URL: {url}")));
                }
            }
        }

        if self.timeout.is_zero() {
            return Err(ApiError::Config("timeout must be greater than zero".into()));
        }
        if self.refresh_margin_secs < 0 {
            return Err(ApiError::Config("refresh margin must not be negative".into()));
        }
        Ok(())
    }
}
