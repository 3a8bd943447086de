//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::time::Duration;

use hsdp_domain::Service;
use hsdp_infra::{config, ApiError, HsdpClient};
use tempfile::{Builder, NamedTempFile};

fn config_file(extension: &str, contents: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    file
}

#[test]
fn test_load_config_from_json_file() -> anyhow::Result<()> {
    let file = config_file(
        "json",
        r#"{
            "iam_url": "https://iam.example.com",
            "idm_url": "https://idm.example.com",
            "cdr_url": "https://cdr.example.com",
            "cdr_root_org_id": "org-1",
            "credentials": {
                "client_id": "client",
                "client_secret": "secret",
                "shared_key": "shared",
                "secret_key": "signing"
            },
            "timeout_secs": 10
        }"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))?;

    assert_eq!(config.service_url(Service::Iam).unwrap().as_str(), "https://iam.example.com/");
    assert_eq!(config.service_url(Service::Idm).unwrap().as_str(), "https://idm.example.com/");
    assert!(config.service_url(Service::Notification).is_none());
    assert_eq!(config.cdr_root_org_id.as_deref(), Some("org-1"));
    assert_eq!(config.credentials.shared_key(), Some("shared"));
    assert_eq!(config.timeout(), Duration::from_secs(10));
    assert_eq!(config.refresh_margin_secs, 60);
    Ok(())
}

#[test]
fn test_load_config_from_toml_file() {
    let file = config_file(
        "toml",
        r#"
iam_url = "https://iam.example.com"
notification_url = "https://notification.example.com/base"
refresh_margin_secs = 120

[credentials]
client_id = "client"
client_secret = "secret"
"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("TOML config should load");

    assert_eq!(
        config.service_url(Service::Notification).unwrap().as_str(),
        "https://notification.example.com/base/"
    );
    assert_eq!(config.refresh_margin_secs, 120);
    assert_eq!(config.credentials.client_id(), "client");
    assert!(config.credentials.shared_key().is_none());
}

/// Secrets stay out of `Debug` output even when loaded from a file
#[test]
fn test_loaded_secrets_are_redacted() {
    let file = config_file(
        "json",
        r#"{"iam_url": "https://iam.example.com",
            "credentials": {"client_id": "client", "client_secret": "hunter2"}}"#,
    );
    let config = config::load_from_file(Some(file.path().to_path_buf())).unwrap();

    let rendered = format!("{config:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("client"));
}

#[test]
fn test_invalid_files_rejected() {
    let missing_secret = config_file(
        "json",
        r#"{"iam_url": "https://iam.example.com",
            "credentials": {"client_id": "client", "client_secret": ""}}"#,
    );
    let err = config::load_from_file(Some(missing_secret.path().to_path_buf())).unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));

    let malformed = config_file("toml", "iam_url = [");
    let err = config::load_from_file(Some(malformed.path().to_path_buf())).unwrap_err();
    assert!(err.to_string().contains("TOML"));

    let unsupported = config_file("yaml", "iam_url: x");
    assert!(config::load_from_file(Some(unsupported.path().to_path_buf())).is_err());

    let err = config::load_from_file(Some("/nonexistent/hsdp.json".into())).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

/// A loaded file is enough to build the full client
#[test]
fn test_client_from_loaded_file() -> anyhow::Result<()> {
    let file = config_file(
        "json",
        r#"{"iam_url": "https://iam.example.com",
            "cdr_url": "https://cdr.example.com",
            "cdr_root_org_id": "org-9",
            "credentials": {"client_id": "client", "client_secret": "secret"}}"#,
    );
    let config = config::load_from_file(Some(file.path().to_path_buf()))?;

    let client = HsdpClient::new(config)?;
    assert_eq!(client.cdr()?.endpoint_url().as_str(), "https://cdr.example.com/store/fhir/org-9");
    Ok(())
}
