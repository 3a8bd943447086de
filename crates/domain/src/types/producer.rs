//! Notification producer types

use std::sync::OnceLock;

use hsdp_common::validation::{Constraint, ConstraintSet, FieldValue, Validate};
use serde::{Deserialize, Serialize};

/// A service registered to publish notification messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producer {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub managing_organization_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managing_organization: Option<String>,
    #[serde(default)]
    pub producer_product_name: String,
    #[serde(default)]
    pub producer_service_name: String,
    #[serde(default)]
    pub producer_service_instance_name: String,
    #[serde(default)]
    pub producer_service_base_url: String,
    #[serde(default)]
    pub producer_service_path_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Producer {
    /// Server-assigned identifier
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

impl Validate for Producer {
    fn constraints() -> &'static ConstraintSet {
        static RULES: OnceLock<ConstraintSet> = OnceLock::new();
        RULES.get_or_init(|| {
            ConstraintSet::new()
                .field("managingOrganizationId", [Constraint::Required])
                .field("producerProductName", [Constraint::Required])
                .field("producerServiceName", [Constraint::Required])
                .field("producerServiceInstanceName", [Constraint::Required])
                .field("producerServiceBaseUrl", [Constraint::Required])
                .field("producerServicePathUrl", [Constraint::Required])
        })
    }

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "_id" => FieldValue::opt_str(self.id.as_deref()),
            "managingOrganizationId" => FieldValue::Str(&self.managing_organization_id),
            "producerProductName" => FieldValue::Str(&self.producer_product_name),
            "producerServiceName" => FieldValue::Str(&self.producer_service_name),
            "producerServiceInstanceName" => FieldValue::Str(&self.producer_service_instance_name),
            "producerServiceBaseUrl" => FieldValue::Str(&self.producer_service_base_url),
            "producerServicePathUrl" => FieldValue::Str(&self.producer_service_path_url),
            _ => FieldValue::Absent,
        }
    }
}
