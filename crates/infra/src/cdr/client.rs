//! CDR FHIR store client
//!
//! Resources are opaque JSON values; only `resourceType` and `id` are read
//! from them. Requests go to the tenant endpoint
//! `<cdr_url>/store/fhir/<root org id>`.

use std::sync::Arc;

use hsdp_common::auth::with_trailing_slash;
use hsdp_domain::constants::{
    CDR_API_VERSION, DEFAULT_FHIR_VERSION, FHIR_JSON_CONTENT_TYPE, FHIR_STORE_PATH,
};
use hsdp_domain::Service;
use serde_json::Value;
use tracing::{info, instrument};
use url::Url;

use crate::api::{ApiClient, ApiError};
use crate::http::ApiRequest;

/// FHIR store operations for one tenant organization
#[derive(Debug, Clone)]
pub struct CdrClient {
    api: Arc<ApiClient>,
    fhir_store: Url,
    endpoint: Url,
    fhir_version: String,
}

impl CdrClient {
    /// # Errors
    /// Returns `ApiError::Config` if no CDR URL is configured or the root
    /// organization id is empty
    pub fn new(api: Arc<ApiClient>, root_org_id: &str) -> Result<Self, ApiError> {
        let root_org_id = root_org_id.trim_matches('/');
        if root_org_id.is_empty() {
            return Err(ApiError::Config("CDR root organization id is required".into()));
        }

        let fhir_store = api
            .base_url(Service::Cdr)?
            .join(FHIR_STORE_PATH)
            .map_err(|e| ApiError::Config(format!("FHIR store URL: {e}")))?;
        let endpoint = fhir_store
            .join(root_org_id)
            .map_err(|e| ApiError::Config(format!("CDR endpoint URL: {e}")))?;

        Ok(Self { api, fhir_store, endpoint, fhir_version: DEFAULT_FHIR_VERSION.to_string() })
    }

    /// Use another FHIR version in the media type
    #[must_use]
    pub fn with_fhir_version(mut self, version: impl Into<String>) -> Self {
        self.fhir_version = version.into();
        self
    }

    /// FHIR store root, with trailing slash
    pub fn fhir_store_url(&self) -> &Url {
        &self.fhir_store
    }

    /// Tenant endpoint requests are sent to
    pub fn endpoint_url(&self) -> &Url {
        &self.endpoint
    }

    /// Point the client at another tenant endpoint
    ///
    /// # Errors
    /// Returns `ApiError::Config` unless `url` is an absolute http(s) URL
    pub fn set_endpoint_url(&mut self, url: &str) -> Result<(), ApiError> {
        let parsed =
            Url::parse(url).map_err(|e| ApiError::Config(format!("endpoint {url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(ApiError::Config(format!("endpoint {url:?} is not an http(s) URL")));
        }
        self.endpoint = parsed;
        Ok(())
    }

    /// Media type sent as both `Content-Type` and `Accept`
    pub fn media_type(&self) -> String {
        format!("{FHIR_JSON_CONTENT_TYPE};fhirVersion={}", self.fhir_version)
    }

    fn request(&self, request: ApiRequest) -> ApiRequest {
        request
            .with_base(with_trailing_slash(self.endpoint.clone()))
            .api_version(CDR_API_VERSION)
            .media_type(self.media_type())
    }

    /// # Errors
    /// Returns status and decode errors
    #[instrument(skip(self))]
    pub async fn read(&self, resource_type: &str, id: &str) -> Result<Value, ApiError> {
        let request =
            self.request(ApiRequest::get(Service::Cdr, "").segment(resource_type).segment(id));
        self.api.execute(&request).await?.decode()
    }

    /// Create `resource` and return its new id
    ///
    /// # Errors
    /// Returns `ApiError::Build` if `resourceType` is missing and
    /// `ApiError::PostCreateInvariant` if the response has no usable `Location`
    #[instrument(skip(self, resource))]
    pub async fn create(&self, resource: &Value) -> Result<String, ApiError> {
        let resource_type = string_field(resource, "resourceType")?;
        let request = ApiRequest::post(Service::Cdr, "").segment(resource_type).json(resource)?;
        let request = self.request(request);

        let id = self.api.execute(&request).await?.location_id(resource_type)?;
        info!(resource_type, %id, "FHIR resource created");
        Ok(id)
    }

    /// Replace `resource`, addressed by its `resourceType` and `id`
    ///
    /// # Errors
    /// Returns `ApiError::Build` if either field is missing
    #[instrument(skip(self, resource))]
    pub async fn update(&self, resource: &Value) -> Result<Value, ApiError> {
        let resource_type = string_field(resource, "resourceType")?;
        let id = string_field(resource, "id")?;
        let request = self.request(
            ApiRequest::put(Service::Cdr, "").segment(resource_type).segment(id).json(resource)?,
        );
        self.api.execute(&request).await?.decode()
    }

    /// Delete a resource; `true` only for 204
    ///
    /// # Errors
    /// Returns transport and status errors
    #[instrument(skip(self))]
    pub async fn delete(&self, resource_type: &str, id: &str) -> Result<bool, ApiError> {
        let request =
            self.request(ApiRequest::delete(Service::Cdr, "").segment(resource_type).segment(id));
        Ok(self.api.execute(&request).await?.is_no_content())
    }
}

fn string_field<'a>(resource: &'a Value, name: &str) -> Result<&'a str, ApiError> {
    resource
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::Build(format!("FHIR resource has no {name}")))
}
