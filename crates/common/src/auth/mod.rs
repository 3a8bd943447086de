//! OAuth 2.0 infrastructure for the IAM identity provider
//!
//! Obtains, caches and refreshes bearer tokens for every resource service of
//! a client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  TokenManager   │  Token lifecycle + single-flight refresh
//! └────────┬────────┘
//!          │
//!          └──► OAuthClientTrait
//!                    │
//!                    └──► OAuthClient   (token + introspect endpoints)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use hsdp_common::auth::{Credentials, OAuthClient, OAuthConfig, TokenManager};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OAuthConfig::new(
//!         Url::parse("https://iam-client-test.us-east.philips-healthsuite.com")?,
//!         Credentials::new("client_id", "client_secret"),
//!     );
//!     let client = OAuthClient::new(config, Duration::from_secs(30))?;
//!     let manager = TokenManager::new(client, 60);
//!
//!     manager.login("user@example.com", "password").await?;
//!
//!     // Refreshes transparently when the token is close to expiry
//!     let token = manager.access_token().await?;
//!     println!("bearer {}", token.len());
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: Core OAuth types (`TokenSet`, `Credentials`, `OAuthConfig`)
//! - **[`client`]**: OAuth HTTP client for grants, refresh and introspection
//! - **[`token_manager`]**: Token lifecycle management with single-flight
//!   refresh
//! - **[`traits`]**: Provider abstraction used by the token manager

pub mod client;
pub mod token_manager;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use client::{Grant, OAuthClient, OAuthClientError, INTROSPECT_API_VERSION, TOKEN_API_VERSION};
pub use token_manager::{TokenManager, TokenManagerError, DEFAULT_REFRESH_THRESHOLD_SECS};
pub use traits::OAuthClientTrait;
pub use types::{
    with_trailing_slash, AuthState, Credentials, IntrospectResponse, OAuthConfig, OAuthError,
    TokenResponse, TokenSet,
};
