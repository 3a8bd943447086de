//! Outbound request construction
//!
//! An [`ApiRequest`] describes one call independently of the token it will
//! carry, so the same description can be rebuilt after a token refresh.
//!
//! Static paths come from constants; caller-supplied identifiers are added
//! with [`ApiRequest::segment`] and percent-encoded as single path segments.

use hsdp_domain::Service;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Request};
use serde::Serialize;
use url::Url;

use crate::api::ApiError;

/// Default media type for request and response bodies
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Description of one outbound call
#[derive(Debug, Clone)]
pub struct ApiRequest {
    service: Service,
    base: Option<Url>,
    method: Method,
    path: String,
    segments: Vec<String>,
    api_version: Option<String>,
    query: Option<String>,
    body: Option<Vec<u8>>,
    content_type: String,
    accept: String,
    headers: HeaderMap,
}

impl ApiRequest {
    /// Request for `path` relative to the service base URL
    pub fn new(service: Service, method: Method, path: impl Into<String>) -> Self {
        Self {
            service,
            base: None,
            method,
            path: path.into(),
            segments: Vec::new(),
            api_version: None,
            query: None,
            body: None,
            content_type: JSON_CONTENT_TYPE.to_string(),
            accept: JSON_CONTENT_TYPE.to_string(),
            headers: HeaderMap::new(),
        }
    }

    /// `GET` request
    pub fn get(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::GET, path)
    }

    /// `POST` request
    pub fn post(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::POST, path)
    }

    /// `PUT` request
    pub fn put(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::PUT, path)
    }

    /// `DELETE` request
    pub fn delete(service: Service, path: impl Into<String>) -> Self {
        Self::new(service, Method::DELETE, path)
    }

    /// Resolve `path` against `base` instead of the service URL
    #[must_use]
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = Some(base);
        self
    }

    /// Value of the `api-version` header
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Append one path segment such as a resource identifier
    ///
    /// The segment is percent-encoded, so `/`, `?` and `#` stay inside it.
    #[must_use]
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Media type for both `Content-Type` and `Accept`
    #[must_use]
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        let media_type = media_type.into();
        self.accept.clone_from(&media_type);
        self.content_type = media_type;
        self
    }

    /// Add an extra header
    ///
    /// # Errors
    /// Returns `ApiError::Build` for an invalid header name or value
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, ApiError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::Build(format!("header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::Build(format!("header {name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Encode query options; unset `Option` fields are left out
    ///
    /// # Errors
    /// Returns `ApiError::Build` if `options` is not a flat struct or map
    pub fn query<Q: Serialize>(mut self, options: &Q) -> Result<Self, ApiError> {
        let encoded = serde_urlencoded::to_string(options)
            .map_err(|e| ApiError::Build(format!("query options: {e}")))?;
        if !encoded.is_empty() {
            self.query = Some(match self.query.take() {
                Some(existing) => format!("{existing}&{encoded}"),
                None => encoded,
            });
        }
        Ok(self)
    }

    /// Attach a JSON body
    ///
    /// # Errors
    /// Returns `ApiError::Build` if `body` cannot be serialized
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let encoded =
            serde_json::to_vec(body).map_err(|e| ApiError::Build(format!("request body: {e}")))?;
        self.body = Some(encoded);
        Ok(self)
    }

    /// Service whose base URL the request resolves against
    pub fn service(&self) -> Service {
        self.service
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Static path, without appended segments
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Resolve the URL against `service_base` (or the override base)
    ///
    /// # Errors
    /// Returns `ApiError::Build` for an empty path, an absolute URL, an empty
    /// path segment, or an identifier segment that is empty, `.` or `..`
    pub fn url(&self, service_base: &Url) -> Result<Url, ApiError> {
        validate_path(&self.path, self.segments.is_empty())?;
        for segment in &self.segments {
            validate_segment(segment)?;
        }

        let base = self.base.as_ref().unwrap_or(service_base);
        let mut url = base
            .join(self.path.trim_start_matches('/'))
            .map_err(|e| ApiError::Build(format!("path {:?}: {e}", self.path)))?;

        if !self.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| ApiError::Build(format!("base URL {base} cannot take a path")))?
                .pop_if_empty()
                .extend(&self.segments);
        }
        if let Some(query) = &self.query {
            url.set_query(Some(query));
        }
        Ok(url)
    }

    /// Build the reqwest request carrying `token`
    ///
    /// # Errors
    /// Returns `ApiError::Build` if the path or a header value is invalid
    pub fn build(&self, service_base: &Url, token: &str) -> Result<Request, ApiError> {
        let url = self.url(service_base)?;
        let mut request = Request::new(self.method.clone(), url);

        let headers = request.headers_mut();
        headers.clone_from(&self.headers);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"), "authorization")?);
        headers.insert(ACCEPT, header_value(&self.accept, "accept")?);
        if let Some(version) = &self.api_version {
            headers.insert("api-version", header_value(version, "api-version")?);
        }

        if let Some(body) = &self.body {
            headers.insert(CONTENT_TYPE, header_value(&self.content_type, "content-type")?);
            *request.body_mut() = Some(body.clone().into());
        }
        Ok(request)
    }
}

fn validate_path(path: &str, require_path: bool) -> Result<(), ApiError> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        if require_path {
            return Err(ApiError::Build("empty request path".into()));
        }
        return Ok(());
    }
    if path.contains("://") {
        return Err(ApiError::Build(format!("absolute URL not allowed as path: {path}")));
    }
    if trimmed.split('/').any(|s| s.is_empty() || is_dot_segment(s)) {
        return Err(ApiError::Build(format!("invalid path segment in {path:?}")));
    }
    Ok(())
}

fn validate_segment(segment: &str) -> Result<(), ApiError> {
    if segment.is_empty() {
        return Err(ApiError::Build("empty identifier in request path".into()));
    }
    if is_dot_segment(segment) {
        return Err(ApiError::Build(format!("{segment:?} is not a valid identifier")));
    }
    Ok(())
}

/// `.` or `..`, including percent-encoded dots
fn is_dot_segment(segment: &str) -> bool {
    matches!(segment.to_ascii_lowercase().replace("%2e", ".").as_str(), "." | "..")
}

fn header_value(value: &str, name: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::Build(format!("header {name}: {e}")))
}
