//! Service constants
//!
//! Resource paths, `api-version` values and wire defaults shared by the
//! service clients.

// IAM application clients (served by the IDM base URL)
/// Application client collection path
pub const CLIENT_PATH: &str = "authorize/identity/Client";
/// `api-version` of the client endpoints
pub const CLIENT_API_VERSION: &str = "1";
/// Sub-resource that replaces a client's scopes
pub const SCOPES_SUBRESOURCE: &str = "$scopes";

// Notification producers
/// Producer collection path
pub const PRODUCER_PATH: &str = "core/notification/Producer";
/// `api-version` of the producer endpoints
pub const PRODUCER_API_VERSION: &str = "2";

// CDR FHIR store
/// FHIR store root below the CDR base URL
pub const FHIR_STORE_PATH: &str = "store/fhir/";
/// `api-version` sent to the FHIR store
pub const CDR_API_VERSION: &str = "1";
/// FHIR JSON media type, without version parameter
pub const FHIR_JSON_CONTENT_TYPE: &str = "application/fhir+json";
/// FHIR release requested by default
pub const DEFAULT_FHIR_VERSION: &str = "3.0";

// Client defaults
/// Request timeout when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Seconds before expiry at which tokens are refreshed
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;
/// `User-Agent` sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("hsdp-client-rs/", env!("CARGO_PKG_VERSION"));

// Application client constraint bounds
/// One year
pub const MAX_ACCESS_TOKEN_LIFETIME_SECS: i64 = 31_536_000;
/// Five years
pub const MAX_REFRESH_TOKEN_LIFETIME_SECS: i64 = 157_680_000;
/// One year
pub const MAX_ID_TOKEN_LIFETIME_SECS: i64 = 31_536_000;
