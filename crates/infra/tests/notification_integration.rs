//! Integration tests for notification producers

mod support;

use hsdp_domain::{GetProducersOptions, Producer};
use hsdp_infra::ApiError;
use serde_json::json;
use support::TestServices;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const PRODUCER_PATH: &str = "/core/notification/Producer";

fn producer() -> Producer {
    Producer {
        managing_organization_id: "org-1".into(),
        managing_organization: Some("Pawnee".into()),
        producer_product_name: "parks".into(),
        producer_service_name: "permits".into(),
        producer_service_instance_name: "permits-1".into(),
        producer_service_base_url: "https://permits.example.com/".into(),
        producer_service_path_url: "notify".into(),
        description: Some("permit events".into()),
        ..Default::default()
    }
}

/// The create response body is the created producer
#[tokio::test]
async fn test_create_producer() {
    let services = TestServices::logged_in().await;
    let mut created = producer();
    created.id = Some("p-1".into());
    created.resource_type = Some("Producer".into());

    Mock::given(method("POST"))
        .and(path(PRODUCER_PATH))
        .and(header("api-version", "2"))
        .and(body_partial_json(json!({"producerProductName": "parks"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(&created))
        .expect(1)
        .mount(&services.server)
        .await;

    let result = services.client.producers().create_producer(&producer()).await.unwrap();
    assert_eq!(result, created);
}

/// A create answered without a body or without an `_id` is a post-create
/// failure
#[tokio::test]
async fn test_create_without_identifier() {
    let responses =
        [ResponseTemplate::new(201), ResponseTemplate::new(201).set_body_json(producer())];
    for response in responses {
        let services = TestServices::logged_in().await;
        Mock::given(method("POST")).respond_with(response).mount(&services.server).await;

        let err = services.client.producers().create_producer(&producer()).await.unwrap_err();
        assert!(matches!(err, ApiError::PostCreateInvariant(_)), "{err:?}");
    }
}

#[tokio::test]
async fn test_create_validates_first() {
    let services = TestServices::logged_in().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&services.server)
        .await;

    let invalid = Producer { producer_service_base_url: String::new(), ..producer() };
    let err = services.client.producers().create_producer(&invalid).await.unwrap_err();
    match err {
        ApiError::Validation(errors) => assert!(errors.has_field("producerServiceBaseUrl")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// Wrapped entries decode in order
#[tokio::test]
async fn test_get_producers() {
    let services = TestServices::logged_in().await;
    Mock::given(method("GET"))
        .and(path(PRODUCER_PATH))
        .and(query_param("producerProductName", "parks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceType": "Bundle",
            "type": "searchset",
            "total": 2,
            "entry": [
                {"resource": {"_id": "p-1", "managingOrganizationId": "org-1",
                              "producerProductName": "parks"}},
                {"resource": {"_id": "p-2", "managingOrganizationId": "org-1",
                              "producerProductName": "parks"}}
            ]
        })))
        .mount(&services.server)
        .await;

    let options =
        GetProducersOptions { producer_product_name: Some("parks".into()), ..Default::default() };
    let producers = services.client.producers().get_producers(&options).await.unwrap();
    let ids: Vec<_> = producers.iter().filter_map(Producer::id).collect();
    assert_eq!(ids, ["p-1", "p-2"]);
}

/// Zero total and 404 are both empty results
#[tokio::test]
async fn test_empty_results() {
    let services = TestServices::logged_in().await;
    Mock::given(method("GET"))
        .and(query_param("_id", "none"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "entry": []})))
        .mount(&services.server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("_id", "gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&services.server)
        .await;

    let producers = services.client.producers();
    assert!(producers.get_producer_by_id("none").await.unwrap_err().is_empty_result());
    assert!(producers.get_producer_by_id("gone").await.unwrap_err().is_empty_result());
}

#[tokio::test]
async fn test_delete_producer() {
    let services = TestServices::logged_in().await;
    Mock::given(method("DELETE"))
        .and(path("/core/notification/Producer/p-1"))
        .and(header("api-version", "2"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&services.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/core/notification/Producer/p-2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&services.server)
        .await;

    let producers = services.client.producers();
    assert!(producers.delete_producer("p-1").await.unwrap());
    assert!(!producers.delete_producer("p-2").await.unwrap());
}
