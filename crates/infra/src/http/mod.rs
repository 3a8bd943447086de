//! HTTP plumbing: transport, request construction and response decoding

pub mod client;
pub mod request;
pub mod response;

pub use client::{HttpClient, HttpClientBuilder};
pub use request::{ApiRequest, JSON_CONTENT_TYPE};
pub use response::{is_success_status, Page, RawResponse, SUCCESS_STATUSES};
