//! Modular common utilities shared across the HSDP client crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: declarative field validation
//! - `observability`: tracing subscriber setup
//! - `platform`: OAuth2 client and token lifecycle management

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod validation;

// Observability tier
// --------------------------------------------------------------
#[cfg(feature = "observability")]
pub mod observability;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "platform")]
pub use auth::{
    AuthState, Credentials, OAuthClient, OAuthClientError, OAuthClientTrait, OAuthConfig,
    TokenManager, TokenManagerError, TokenSet,
};
#[cfg(feature = "foundation")]
pub use validation::{
    Constraint, ConstraintSet, FieldError, FieldValue, Validate, ValidationError,
    ValidationResult, Validator,
};
