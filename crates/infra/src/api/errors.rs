//! API-specific error types
//!
//! Every failure of a service call surfaces as one [`ApiError`]; the
//! category drives retry decisions and log labels.

use hsdp_common::auth::TokenManagerError;
use hsdp_common::validation::ValidationError;
use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Rejected locally before any request was sent
    Input,
    /// Token acquisition or refresh failed
    Authentication,
    /// Connection failures and timeouts - retryable
    Network,
    /// Server errors (5xx) and throttling (429) - retryable
    Server,
    /// Client errors (4xx) - non-retryable
    Client,
    /// Response did not have the expected shape
    Protocol,
    /// Configuration errors - non-retryable
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource failed its constraint table; nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("authentication failed: {0}")]
    Auth(#[from] TokenManagerError),

    #[error("{method} {target}: transport error: {message}")]
    Transport { method: Method, target: String, message: String },

    #[error("{method} {target}: request timed out")]
    Timeout { method: Method, target: String },

    /// Non-success status; `body` is the full response body
    #[error("{method} {target}: StatusCode {}, Body: {body}", .status.as_u16())]
    Status { status: StatusCode, method: Method, target: String, body: String },

    #[error("decoding response from {target}: {message}")]
    Decode { target: String, message: String },

    #[error("empty result")]
    EmptyResult,

    /// The server accepted a create but the new resource could not be
    /// identified or read back
    #[error("could not read resource after create: {0}")]
    PostCreateInvariant(String),

    #[error("invalid request: {0}")]
    Build(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("operation failed: {0}")]
    OperationFailed(String),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Validation(_) | Self::Build(_) => ApiErrorCategory::Input,
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::Transport { .. } | Self::Timeout { .. } => ApiErrorCategory::Network,
            Self::Status { status, .. }
                if status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS =>
            {
                ApiErrorCategory::Server
            }
            Self::Status { .. } | Self::EmptyResult => ApiErrorCategory::Client,
            Self::Decode { .. } | Self::PostCreateInvariant(_) | Self::OperationFailed(_) => {
                ApiErrorCategory::Protocol
            }
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Whether repeating the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ApiErrorCategory::Network | ApiErrorCategory::Server)
    }

    /// The lookup matched nothing
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult)
    }

    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stable label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Auth(_) => "auth",
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
            Self::EmptyResult => "empty_result",
            Self::PostCreateInvariant(_) => "post_create_invariant",
            Self::Build(_) => "build",
            Self::Config(_) => "config",
            Self::OperationFailed(_) => "operation_failed",
        }
    }
}
