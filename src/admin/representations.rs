//! Wire representations for the admin REST API.
//!
//! Field names follow the server's camelCase JSON; absent fields are omitted
//! on the wire so partial updates do not clear server-side state.

use serde::{Deserialize, Serialize};

/// A user as exposed by the admin API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRepresentation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UserRepresentation {
    /// A new enabled user whose username and email are both `email`.
    pub fn new_enabled(email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            username: Some(email.clone()),
            email: Some(email),
            enabled: Some(true),
            ..Self::default()
        }
    }
}

/// A federated-identity link between a local user and an external
/// identity-provider account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FederatedIdentityLink {
    /// Identity-provider alias (e.g. "google").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_provider: Option<String>,
    /// Account id at the external provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Account username at the external provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl FederatedIdentityLink {
    /// Build a complete link.
    pub fn new(
        identity_provider: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            identity_provider: Some(identity_provider.into()),
            user_id: Some(user_id.into()),
            user_name: Some(user_name.into()),
        }
    }
}
