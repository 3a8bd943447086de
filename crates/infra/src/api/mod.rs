//! Authenticated API access
//!
//! This module provides the client every service goes through: it resolves
//! service base URLs, attaches bearer tokens and retries once after a token
//! refresh when the server answers 401.
//!
//! # Errors
//!
//! All operations return [`ApiError`]; see [`ApiErrorCategory`] for the
//! coarse classification used in logs and retry decisions.

pub mod auth;
pub mod client;
pub mod errors;

pub use auth::AccessTokenProvider;
pub use client::{ApiClient, ApiClientBuilder};
pub use errors::{ApiError, ApiErrorCategory};
