//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If the required variables are set, loads from the environment and
//!    reports any malformed value
//! 2. Otherwise falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `HSDP_OAUTH2_CLIENT_ID`: OAuth2 client id (required)
//! - `HSDP_OAUTH2_SECRET`: OAuth2 client secret (required)
//! - `HSDP_IAM_URL`: Identity provider base URL (required)
//! - `HSDP_IDM_URL`: Identity resources base URL
//! - `HSDP_NOTIFICATION_URL`: Notification service base URL
//! - `HSDP_CDR_URL`: CDR base URL
//! - `HSDP_CDR_ROOT_ORG_ID`: Root organization of the FHIR store tenant
//! - `HSDP_SHARED_KEY` / `HSDP_SECRET_KEY`: Signing key pair (both or none)
//! - `HSDP_TIMEOUT_SECS`: Request timeout in seconds, fractions allowed
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./hsdp.json` or `./hsdp.toml` (current working directory)
//! 2. `../hsdp.json` or `../hsdp.toml` (parent directory)
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::time::Duration;

use hsdp_common::auth::Credentials;
use hsdp_domain::Service;
use url::Url;

use super::ClientConfig;
use crate::api::ApiError;

type Result<T> = std::result::Result<T, ApiError>;

/// Variables without which the environment is not considered configured
const REQUIRED_ENV: [&str; 3] = ["HSDP_OAUTH2_CLIENT_ID", "HSDP_OAUTH2_SECRET", "HSDP_IAM_URL"];

/// Load configuration with automatic fallback strategy
///
/// Loads from environment variables when all required ones are set. If any
/// is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `ApiError::Config` if:
/// - An environment variable has an invalid value
/// - The environment is incomplete and no config file is found
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<ClientConfig> {
    if let Some(key) = REQUIRED_ENV.into_iter().find(|key| optional_var(key).is_none()) {
        tracing::debug!(missing = key, "Environment incomplete, trying file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `ApiError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<ClientConfig> {
    let client_id = env_var("HSDP_OAUTH2_CLIENT_ID")?;
    let secret = env_var("HSDP_OAUTH2_SECRET")?;
    let iam_url = env_url("HSDP_IAM_URL")?
        .ok_or_else(|| missing("HSDP_IAM_URL"))?;

    let mut credentials = Credentials::new(client_id, secret);
    match (optional_var("HSDP_SHARED_KEY"), optional_var("HSDP_SECRET_KEY")) {
        (Some(shared), Some(secret_key)) => {
            credentials = credentials.with_signing_keys(shared, secret_key);
        }
        (None, None) => {}
        _ => {
            return Err(ApiError::Config(
                "HSDP_SHARED_KEY and HSDP_SECRET_KEY must be set together".into(),
            ))
        }
    }

    let mut config = ClientConfig::new(credentials).with_service_url(Service::Iam, iam_url);
    for (key, service) in [
        ("HSDP_IDM_URL", Service::Idm),
        ("HSDP_NOTIFICATION_URL", Service::Notification),
        ("HSDP_CDR_URL", Service::Cdr),
    ] {
        if let Some(url) = env_url(key)? {
            config = config.with_service_url(service, url);
        }
    }
    config.cdr_root_org_id = optional_var("HSDP_CDR_ROOT_ORG_ID");

    if let Some(raw) = optional_var("HSDP_TIMEOUT_SECS") {
        let secs: f64 = raw
            .parse()
            .map_err(|e| ApiError::Config(format!("Invalid HSDP_TIMEOUT_SECS: {e}")))?;
        config.timeout = Duration::try_from_secs_f64(secs)
            .map_err(|e| ApiError::Config(format!("Invalid HSDP_TIMEOUT_SECS: {e}")))?;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `ApiError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ApiError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ApiError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ApiError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ApiError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ApiError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ApiError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidate_files(&cwd));
        candidates.extend(candidate_files(&cwd.join("..")));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidate_files(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidate_files(dir: &Path) -> [PathBuf; 2] {
    [dir.join("hsdp.json"), dir.join("hsdp.toml")]
}

fn missing(key: &str) -> ApiError {
    ApiError::Config(format!("Missing required environment variable: {key}"))
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    optional_var(key).ok_or_else(|| missing(key))
}

/// Non-empty environment variable, if set
fn optional_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_url(key: &str) -> Result<Option<Url>> {
    optional_var(key)
        .map(|raw| Url::parse(&raw).map_err(|e| ApiError::Config(format!("Invalid {key}: {e}"))))
        .transpose()
}
