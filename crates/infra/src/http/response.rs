//! Response envelope decoding
//!
//! A [`RawResponse`] holds the status, headers and full body of one
//! exchange. The body is read exactly once by the transport; decoding and
//! error construction work from that copy.

use std::borrow::Cow;

use hsdp_domain::Bundle;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::ApiError;

/// Statuses the services treat as success
pub const SUCCESS_STATUSES: [StatusCode; 6] = [
    StatusCode::OK,
    StatusCode::CREATED,
    StatusCode::ACCEPTED,
    StatusCode::NO_CONTENT,
    StatusCode::MULTI_STATUS,
    StatusCode::NOT_MODIFIED,
];

/// Whether `status` counts as success
pub fn is_success_status(status: StatusCode) -> bool {
    SUCCESS_STATUSES.contains(&status)
}

/// One fully read HTTP response
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub method: Method,
    /// Request URL, used in error messages
    pub target: String,
}

/// Decoded list: total plus entries in server order
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub total: i64,
    pub entries: Vec<T>,
}

impl<T> Page<T> {
    /// No resource matched the query
    pub fn is_empty_result(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, or `EmptyResult` when nothing matched
    ///
    /// # Errors
    /// Returns `ApiError::EmptyResult` for an empty page
    pub fn non_empty(self) -> Result<Vec<T>, ApiError> {
        if self.is_empty_result() {
            Err(ApiError::EmptyResult)
        } else {
            Ok(self.entries)
        }
    }
}

impl RawResponse {
    /// Pass success statuses through; everything else becomes
    /// `ApiError::Status` carrying the body
    ///
    /// # Errors
    /// Returns `ApiError::Status` for any status outside [`SUCCESS_STATUSES`]
    pub fn check(self) -> Result<Self, ApiError> {
        if is_success_status(self.status) {
            return Ok(self);
        }
        Err(ApiError::Status {
            status: self.status,
            body: self.text().into_owned(),
            method: self.method,
            target: self.target,
        })
    }

    /// Empty acknowledgement
    pub fn is_no_content(&self) -> bool {
        self.status == StatusCode::NO_CONTENT
    }

    /// Body as text, lossy for invalid UTF-8
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Header value, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decode the body as a single resource
    ///
    /// # Errors
    /// Returns `ApiError::Decode` if the body is empty or does not match `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if self.body.is_empty() {
            return Err(self.decode_error("empty body"));
        }
        serde_json::from_slice(&self.body).map_err(|e| self.decode_error(e))
    }

    /// Decode the body as a bundle without decoding its entries
    ///
    /// # Errors
    /// Returns `ApiError::Decode` if the body is not a bundle
    pub fn decode_bundle(&self) -> Result<Bundle, ApiError> {
        self.decode()
    }

    /// Decode a bundle and every entry; one bad entry fails the page
    ///
    /// A bundle without entries yields an empty page, never a decode error.
    /// Entries are decoded even when `total` is zero or absent.
    ///
    /// # Errors
    /// Returns `ApiError::Decode` for a malformed bundle or entry
    pub fn decode_page<T: DeserializeOwned>(&self) -> Result<Page<T>, ApiError> {
        let bundle = self.decode_bundle()?;
        if bundle.is_empty() {
            return Ok(Page { total: bundle.total, entries: Vec::new() });
        }
        let entries: Vec<T> = bundle.decode_entries().map_err(|e| self.decode_error(e))?;
        let total = if bundle.total == 0 {
            i64::try_from(entries.len()).unwrap_or(i64::MAX)
        } else {
            bundle.total
        };
        Ok(Page { total, entries })
    }

    /// Identifier of a created resource from the `Location` header
    ///
    /// The identifier is the path segment following `resource_path`; both
    /// relative and absolute locations are accepted, as are trailing
    /// segments such as `_history/<version>`.
    ///
    /// # Errors
    /// Returns `ApiError::PostCreateInvariant` if the header is missing or
    /// carries no identifier
    pub fn location_id(&self, resource_path: &str) -> Result<String, ApiError> {
        let location = self.headers.get(LOCATION).and_then(|v| v.to_str().ok()).ok_or_else(|| {
            ApiError::PostCreateInvariant(format!("{} {}: no Location header", self.method, self.target))
        })?;

        id_after(location, resource_path).map(str::to_string).ok_or_else(|| {
            ApiError::PostCreateInvariant(format!(
                "unparsable Location {location:?} for {resource_path}"
            ))
        })
    }

    fn decode_error(&self, message: impl std::fmt::Display) -> ApiError {
        ApiError::Decode { target: self.target.clone(), message: message.to_string() }
    }
}

fn id_after<'a>(location: &'a str, resource_path: &str) -> Option<&'a str> {
    let path = location.split(['?', '#']).next()?;
    let marker = format!("{}/", resource_path.trim_matches('/'));
    let start = path.rfind(&marker)? + marker.len();
    let id = path[start..].split('/').next()?;
    (!id.is_empty()).then_some(id)
}
