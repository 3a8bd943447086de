//! Query options for list endpoints
//!
//! Every filter is optional; unset filters are left out of the query string.

use serde::Serialize;

/// Filters for `GET authorize/identity/Client`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetClientsOptions {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
}

impl GetClientsOptions {
    /// Look up a single client by identifier
    pub fn by_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Self::default() }
    }
}

/// Filters for `GET core/notification/Producer`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProducersOptions {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer_product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer_service_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl GetProducersOptions {
    /// Look up a single producer by identifier
    pub fn by_id(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()), ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_filters_are_omitted() {
        let options = GetClientsOptions {
            name: Some("Test Client".into()),
            application_id: Some("app-1".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&options).unwrap();

        assert_eq!(value, serde_json::json!({"name": "Test Client", "applicationId": "app-1"}));
    }

    #[test]
    fn id_filter_uses_underscore_name() {
        let value = serde_json::to_value(GetProducersOptions::by_id("p-1")).unwrap();
        assert_eq!(value, serde_json::json!({"_id": "p-1"}));

        let empty = serde_json::to_value(GetProducersOptions::default()).unwrap();
        assert_eq!(empty, serde_json::json!({}));
    }
}
