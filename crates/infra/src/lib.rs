//! # HSDP Infrastructure
//!
//! Typed clients for the HSDP REST services.
//!
//! This crate contains:
//! - Client configuration and its environment/file loaders
//! - The HTTP transport, request builder and response envelope decoder
//! - The authenticated API client (bearer tokens, refresh on 401)
//! - Service clients: IAM application clients, notification producers and
//!   the CDR FHIR store
//!
//! ## Architecture
//! - Resource types and constraint tables come from `hsdp-domain`
//! - Token lifecycle comes from `hsdp-common`'s platform tier
//! - Contains all I/O
//!
//! ## Example
//!
//! ```no_run
//! use hsdp_infra::{ApiError, HsdpClient};
//!
//! # async fn run() -> Result<(), ApiError> {
//! let client = HsdpClient::from_env()?;
//! client.login_client_credentials().await?;
//! let found = client.clients().get_client_by_id("9a7b0c3e").await?;
//! println!("{}", found.name);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cdr;
pub mod client;
pub mod config;
pub mod http;
pub mod iam;
pub mod notification;

// Re-export commonly used items
pub use api::{AccessTokenProvider, ApiClient, ApiError, ApiErrorCategory};
pub use cdr::CdrClient;
pub use client::{HsdpClient, IamTokenManager};
pub use config::ClientConfig;
pub use http::{ApiRequest, HttpClient, Page, RawResponse};
pub use iam::ClientsService;
pub use notification::ProducerService;
