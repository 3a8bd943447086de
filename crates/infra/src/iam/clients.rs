//! IAM application clients
//!
//! CRUD over `authorize/identity/Client` on the IDM base URL. Scopes cannot
//! be set on create; they are applied through the `$scopes` sub-resource
//! once the client exists, and the client is deleted again if that fails.

use std::sync::Arc;

use hsdp_common::validation::{Validate, ValidationError};
use hsdp_domain::constants::{CLIENT_API_VERSION, CLIENT_PATH, SCOPES_SUBRESOURCE};
use hsdp_domain::{ApplicationClient, GetClientsOptions, ScopesUpdate, Service};
use reqwest::StatusCode;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::http::ApiRequest;

/// Application client operations
#[derive(Debug, Clone)]
pub struct ClientsService {
    api: Arc<ApiClient>,
}

impl ClientsService {
    /// Clients service over a shared API client
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Create a client and return it as stored by the server
    ///
    /// Scopes are applied after the create; if that fails the new client is
    /// deleted and the scopes error returned.
    ///
    /// # Errors
    /// - `ApiError::Validation` before anything is sent
    /// - `ApiError::OperationFailed` if the create answers neither 200 nor 201
    /// - `ApiError::PostCreateInvariant` if the new client cannot be
    ///   identified or read back
    #[instrument(skip(self, client), fields(client_id = %client.client_id))]
    pub async fn create_client(
        &self,
        client: &ApplicationClient,
    ) -> Result<ApplicationClient, ApiError> {
        client.validate()?;

        let mut payload = client.clone();
        let scopes = payload.take_scopes();

        let request = ApiRequest::post(Service::Idm, CLIENT_PATH)
            .api_version(CLIENT_API_VERSION)
            .json(&payload)?;
        let response = self.api.execute(&request).await?;
        if !matches!(response.status, StatusCode::OK | StatusCode::CREATED) {
            return Err(ApiError::OperationFailed(format!(
                "create client answered {}",
                response.status
            )));
        }

        let id = response.location_id(CLIENT_PATH)?;
        debug!(%id, "client created");

        if !scopes.is_empty() {
            if let Err(err) = self.update_scopes(&id, &scopes).await {
                self.rollback(&id).await;
                return Err(err);
            }
        }

        self.get_client_by_id(&id)
            .await
            .map_err(|err| ApiError::PostCreateInvariant(format!("client {id}: {err}")))
    }

    /// List clients matching `options`, in server order
    ///
    /// A 404 is reported as `ApiError::EmptyResult`.
    ///
    /// # Errors
    /// Returns transport, status and decode errors
    #[instrument(skip(self))]
    pub async fn get_clients(
        &self,
        options: &GetClientsOptions,
    ) -> Result<Vec<ApplicationClient>, ApiError> {
        let request = ApiRequest::get(Service::Idm, CLIENT_PATH)
            .api_version(CLIENT_API_VERSION)
            .query(options)?;

        match self.api.execute(&request).await {
            Ok(response) => Ok(response.decode_page::<ApplicationClient>()?.entries),
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => Err(ApiError::EmptyResult),
            Err(err) => Err(err),
        }
    }

    /// Fetch one client by identifier
    ///
    /// # Errors
    /// Returns `ApiError::EmptyResult` if no client has this identifier
    pub async fn get_client_by_id(&self, id: &str) -> Result<ApplicationClient, ApiError> {
        self.get_clients(&GetClientsOptions::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or(ApiError::EmptyResult)
    }

    /// Replace a client with `client`
    ///
    /// # Errors
    /// Returns `ApiError::Validation` if the identifier is missing or a
    /// constraint fails
    #[instrument(skip(self, client), fields(id = client.id()))]
    pub async fn update_client(
        &self,
        client: &ApplicationClient,
    ) -> Result<ApplicationClient, ApiError> {
        let id = client.id().ok_or_else(|| ValidationError::field("id", "id is required"))?;
        client.validate()?;

        let request = ApiRequest::put(Service::Idm, CLIENT_PATH)
            .segment(id)
            .api_version(CLIENT_API_VERSION)
            .json(client)?;
        self.api.execute(&request).await?.decode()
    }

    /// Replace the scopes of client `id`
    ///
    /// # Errors
    /// Returns `ApiError::OperationFailed` for any success status other than 204
    #[instrument(skip(self, scopes))]
    pub async fn update_scopes(&self, id: &str, scopes: &ScopesUpdate) -> Result<(), ApiError> {
        let request = ApiRequest::put(Service::Idm, CLIENT_PATH)
            .segment(id)
            .segment(SCOPES_SUBRESOURCE)
            .api_version(CLIENT_API_VERSION)
            .json(scopes)?;

        let response = self.api.execute(&request).await?;
        if !response.is_no_content() {
            return Err(ApiError::OperationFailed(format!(
                "update scopes of {id} answered {}",
                response.status
            )));
        }
        Ok(())
    }

    /// Delete client `id`
    ///
    /// Returns `true` only for 204; any other success status means the
    /// client was not deleted.
    ///
    /// # Errors
    /// Returns transport and status errors
    #[instrument(skip(self))]
    pub async fn delete_client(&self, id: &str) -> Result<bool, ApiError> {
        let request = ApiRequest::delete(Service::Idm, CLIENT_PATH)
            .segment(id)
            .api_version(CLIENT_API_VERSION);
        let deleted = self.api.execute(&request).await?.is_no_content();
        if deleted {
            info!(%id, "client deleted");
        }
        Ok(deleted)
    }

    async fn rollback(&self, id: &str) {
        match self.delete_client(id).await {
            Ok(true) => debug!(%id, "rolled back partially created client"),
            Ok(false) => warn!(%id, "rollback delete did not remove client"),
            Err(err) => warn!(%id, error = %err, "rollback delete failed"),
        }
    }
}
