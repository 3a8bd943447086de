//! IAM application client types
//!
//! An application client is an OAuth2 client registered under an IAM
//! application. Scopes are managed through a dedicated sub-resource and are
//! therefore stripped from create payloads.

use std::sync::OnceLock;

use hsdp_common::validation::{Constraint, ConstraintSet, FieldValue, Validate};
use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_ACCESS_TOKEN_LIFETIME_SECS, MAX_ID_TOKEN_LIFETIME_SECS, MAX_REFRESH_TOKEN_LIFETIME_SECS,
};

/// IAM application client resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationClient {
    /// Server-assigned identifier; absent until created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub client_id: String,
    /// `Public` or `Confidential`
    #[serde(default, rename = "type")]
    pub client_type: String,
    #[serde(default)]
    pub name: String,
    /// Only sent on create; never returned by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, rename = "redirectionURIs")]
    pub redirection_uris: Vec<String>,
    #[serde(default)]
    pub response_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub application_id: String,
    #[serde(default)]
    pub global_reference_id: String,
    #[serde(default)]
    pub consent_implied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_lifetime: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_lifetime: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token_lifetime: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub realms: Vec<String>,
    /// Populated by the server only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ClientMeta>,
}

/// Server-maintained version metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// Body of `PUT <client>/$scopes`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopesUpdate {
    pub scopes: Vec<String>,
    pub default_scopes: Vec<String>,
}

impl ApplicationClient {
    /// Identifier, if the client has been created
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Remove the scope lists, returning them for a follow-up scopes update
    pub fn take_scopes(&mut self) -> ScopesUpdate {
        ScopesUpdate {
            scopes: std::mem::take(&mut self.scopes),
            default_scopes: std::mem::take(&mut self.default_scopes),
        }
    }
}

impl ScopesUpdate {
    /// Whether a scopes update carries anything to apply
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty() && self.default_scopes.is_empty()
    }
}

impl Validate for ApplicationClient {
    fn constraints() -> &'static ConstraintSet {
        static RULES: OnceLock<ConstraintSet> = OnceLock::new();
        RULES.get_or_init(|| {
            ConstraintSet::new()
                .field("clientId", [Constraint::Required, Constraint::length(5, 20)])
                .field("name", [Constraint::Required, Constraint::length(5, 50)])
                .field("password", [Constraint::RequiredWithout("id"), Constraint::max_len(16)])
                .field("description", [Constraint::max_len(250)])
                .field("applicationId", [Constraint::Required])
                .field("globalReferenceId", [Constraint::Required, Constraint::length(3, 50)])
                .field(
                    "accessTokenLifetime",
                    [Constraint::range(0, MAX_ACCESS_TOKEN_LIFETIME_SECS)],
                )
                .field(
                    "refreshTokenLifetime",
                    [Constraint::range(0, MAX_REFRESH_TOKEN_LIFETIME_SECS)],
                )
                .field("idTokenLifetime", [Constraint::range(0, MAX_ID_TOKEN_LIFETIME_SECS)])
                .field("realms", [Constraint::RequiredWith("id")])
        })
    }

    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "id" => FieldValue::opt_str(self.id.as_deref()),
            "clientId" => FieldValue::Str(&self.client_id),
            "name" => FieldValue::Str(&self.name),
            "password" => FieldValue::opt_str(self.password.as_deref()),
            "description" => FieldValue::Str(&self.description),
            "applicationId" => FieldValue::Str(&self.application_id),
            "globalReferenceId" => FieldValue::Str(&self.global_reference_id),
            "accessTokenLifetime" => lifetime(self.access_token_lifetime),
            "refreshTokenLifetime" => lifetime(self.refresh_token_lifetime),
            "idTokenLifetime" => lifetime(self.id_token_lifetime),
            "realms" => FieldValue::List(&self.realms),
            _ => FieldValue::Absent,
        }
    }
}

fn lifetime(value: Option<i64>) -> FieldValue<'static> {
    value.map_or(FieldValue::Absent, FieldValue::Int)
}
