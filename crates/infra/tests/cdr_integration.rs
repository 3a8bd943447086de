//! Integration tests for the CDR FHIR store client

mod support;

use serde_json::json;
use support::{TestServices, ROOT_ORG_ID};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const FHIR_MEDIA_TYPE: &str = "application/fhir+json;fhirVersion=3.0";

fn org_path(rest: &str) -> String {
    format!("/store/fhir/{ROOT_ORG_ID}/{rest}")
}

#[tokio::test]
async fn test_endpoint_urls() {
    let services = TestServices::start().await;
    let mut cdr = services.client.cdr().unwrap();

    assert_eq!(cdr.fhir_store_url().as_str(), format!("{}/store/fhir/", services.server.uri()));
    let endpoint = cdr.endpoint_url().to_string();
    assert_eq!(endpoint, format!("{}/store/fhir/{ROOT_ORG_ID}", services.server.uri()));

    cdr.set_endpoint_url(&endpoint).unwrap();
    assert_eq!(cdr.endpoint_url().as_str(), endpoint);
}

/// Create returns the id from a versioned Location
#[tokio::test]
async fn test_create_resource() {
    let services = TestServices::logged_in().await;
    let location = format!(
        "{}/store/fhir/{ROOT_ORG_ID}/Organization/o-1/_history/1",
        services.server.uri()
    );
    Mock::given(method("POST"))
        .and(path(org_path("Organization")))
        .and(header("content-type", FHIR_MEDIA_TYPE))
        .and(header("accept", FHIR_MEDIA_TYPE))
        .and(body_partial_json(json!({"resourceType": "Organization"})))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", location.as_str()))
        .expect(1)
        .mount(&services.server)
        .await;

    let cdr = services.client.cdr().unwrap();
    let id = cdr
        .create(&json!({"resourceType": "Organization", "name": "Hospital", "active": true}))
        .await
        .unwrap();
    assert_eq!(id, "o-1");
}

#[tokio::test]
async fn test_read_update_delete() {
    let services = TestServices::logged_in().await;
    let organization = json!({"resourceType": "Organization", "id": "o-1", "name": "Hospital"});

    Mock::given(method("GET"))
        .and(path(org_path("Organization/o-1")))
        .and(header("accept", FHIR_MEDIA_TYPE))
        .respond_with(ResponseTemplate::new(200).set_body_json(&organization))
        .mount(&services.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(org_path("Organization/o-1")))
        .and(body_partial_json(json!({"name": "Clinic"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceType": "Organization", "id": "o-1", "name": "Clinic",
            "meta": {"versionId": "2"}
        })))
        .mount(&services.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(org_path("Organization/o-1")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&services.server)
        .await;

    let cdr = services.client.cdr().unwrap();
    assert_eq!(cdr.read("Organization", "o-1").await.unwrap(), organization);

    let mut changed = organization.clone();
    changed["name"] = json!("Clinic");
    let updated = cdr.update(&changed).await.unwrap();
    assert_eq!(updated["meta"]["versionId"], "2");

    assert!(cdr.delete("Organization", "o-1").await.unwrap());
}

/// A missing resource surfaces the server's OperationOutcome
#[tokio::test]
async fn test_read_missing_resource() {
    let services = TestServices::logged_in().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "resourceType": "OperationOutcome",
            "issue": [{"severity": "error", "code": "not-found"}]
        })))
        .mount(&services.server)
        .await;

    let cdr = services.client.cdr().unwrap();
    let err = cdr.read("Patient", "p-404").await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
    assert!(err.to_string().contains("OperationOutcome"));
}

/// Resource type and id each stay one segment below the tenant endpoint
#[tokio::test]
async fn test_identifiers_escaped_below_endpoint() {
    let services = TestServices::logged_in().await;
    Mock::given(method("DELETE"))
        .and(path(org_path("Patient/..%2F..%2Forg-2%2FPatient%2Fp-1")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&services.server)
        .await;

    let cdr = services.client.cdr().unwrap();
    assert!(cdr.delete("Patient", "../../org-2/Patient/p-1").await.unwrap());

    let err = cdr.read("..", "p-1").await.unwrap_err();
    assert!(matches!(err, hsdp_infra::ApiError::Build(_)), "{err:?}");
}
