//! Notification producers
//!
//! A producer registers a service that publishes messages to topics. Unlike
//! application clients the create response body is the created resource,
//! and an empty list is always reported as `EmptyResult`.

use std::sync::Arc;

use hsdp_common::validation::Validate;
use hsdp_domain::constants::{PRODUCER_API_VERSION, PRODUCER_PATH};
use hsdp_domain::{GetProducersOptions, Producer, Service};
use reqwest::StatusCode;
use tracing::{info, instrument};

use crate::api::{ApiClient, ApiError};
use crate::http::ApiRequest;

/// Client for the notification producer resource
#[derive(Debug, Clone)]
pub struct ProducerService {
    api: Arc<ApiClient>,
}

impl ProducerService {
    /// Producer client over a shared API client
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Register a producer
    ///
    /// # Errors
    /// - `ApiError::Validation` before anything is sent
    /// - `ApiError::PostCreateInvariant` if the response carries no body or
    ///   no identifier
    #[instrument(skip(self, producer), fields(product = %producer.producer_product_name))]
    pub async fn create_producer(&self, producer: &Producer) -> Result<Producer, ApiError> {
        producer.validate()?;

        let request = ApiRequest::post(Service::Notification, PRODUCER_PATH)
            .api_version(PRODUCER_API_VERSION)
            .json(producer)?;
        let response = self.api.execute(&request).await?;
        if response.body.is_empty() {
            return Err(ApiError::PostCreateInvariant(format!(
                "create producer answered {} without a body",
                response.status
            )));
        }

        let created: Producer = response.decode()?;
        if created.id().is_none() {
            return Err(ApiError::PostCreateInvariant("created producer has no _id".into()));
        }
        info!(id = created.id(), "producer created");
        Ok(created)
    }

    /// List producers matching `options`
    ///
    /// # Errors
    /// Returns `ApiError::EmptyResult` for a 404 or a zero total
    #[instrument(skip(self))]
    pub async fn get_producers(
        &self,
        options: &GetProducersOptions,
    ) -> Result<Vec<Producer>, ApiError> {
        let request = ApiRequest::get(Service::Notification, PRODUCER_PATH)
            .api_version(PRODUCER_API_VERSION)
            .query(options)?;

        match self.api.execute(&request).await {
            Ok(response) => response.decode_page::<Producer>()?.non_empty(),
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => Err(ApiError::EmptyResult),
            Err(err) => Err(err),
        }
    }

    /// Fetch one producer by identifier
    ///
    /// # Errors
    /// Returns `ApiError::EmptyResult` if no producer has this identifier
    pub async fn get_producer_by_id(&self, id: &str) -> Result<Producer, ApiError> {
        self.get_producers(&GetProducersOptions::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or(ApiError::EmptyResult)
    }

    /// Delete producer `id`; `true` only for 204
    ///
    /// # Errors
    /// Returns transport and status errors
    #[instrument(skip(self))]
    pub async fn delete_producer(&self, id: &str) -> Result<bool, ApiError> {
        let request = ApiRequest::delete(Service::Notification, PRODUCER_PATH)
            .segment(id)
            .api_version(PRODUCER_API_VERSION);
        Ok(self.api.execute(&request).await?.is_no_content())
    }
}
