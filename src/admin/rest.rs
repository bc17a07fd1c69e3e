//! REST implementation of [`IdentityAdmin`] (reqwest-based).
//!
//! Talks to one identity server's admin API rooted at
//! `{base_url}/auth/admin/realms/{realm}`. The deployed clusters sit behind
//! routes with certificates the harness host does not trust, so certificate
//! verification can be switched off per client.

use crate::admin::representations::{FederatedIdentityLink, UserRepresentation};
use crate::admin::token::{AdminCredentials, AdminTokenSource};
use crate::admin::IdentityAdmin;
use crate::error::{AdminError, AdminResult};
use log::debug;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Connection options for [`RestAdminClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Accept untrusted certificates and skip hostname verification.
    pub trust_all_certificates: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            trust_all_certificates: true,
        }
    }
}

/// Admin REST client bound to one cluster site and one realm.
#[derive(Debug, Clone)]
pub struct RestAdminClient {
    admin_base: String,
    token_source: AdminTokenSource,
    http_client: reqwest::Client,
}

impl RestAdminClient {
    /// Build a client for the server rooted at `base_url`.
    pub fn new(
        base_url: &str,
        realm: &str,
        credentials: AdminCredentials,
        options: ClientOptions,
    ) -> AdminResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.trust_all_certificates)
            .user_agent(concat!("idm-crosscheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdminError::invalid_config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_http_client(base_url, realm, credentials, http_client))
    }

    /// Build a client around a pre-built `reqwest::Client` (for testing).
    pub fn with_http_client(
        base_url: &str,
        realm: &str,
        credentials: AdminCredentials,
        http_client: reqwest::Client,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let admin_base = format!("{base_url}/auth/admin/realms/{realm}");
        let token_source = AdminTokenSource::new(base_url, credentials, http_client.clone());
        Self {
            admin_base,
            token_source,
            http_client,
        }
    }

    /// Root of the admin API for this client's realm.
    pub fn admin_base(&self) -> &str {
        &self.admin_base
    }

    // ── Internal HTTP helpers ─────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> AdminResult<T> {
        debug!("admin GET {url}");
        let mut builder = self.http_client.get(url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        let builder = self.token_source.apply(builder).await?;
        let response = builder.send().await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            self.error_from(operation, response).await
        }
    }

    async fn expect_no_content<B: Serialize>(
        &self,
        operation: &str,
        builder: reqwest::RequestBuilder,
        body: Option<&B>,
    ) -> AdminResult<()> {
        let mut builder = self.token_source.apply(builder).await?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT || status.is_success() {
            Ok(())
        } else {
            self.error_from(operation, response).await
        }
    }

    async fn error_from<T>(&self, operation: &str, response: reqwest::Response) -> AdminResult<T> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // Stale token; the next call re-authenticates.
            self.token_source.invalidate().await;
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        if status == StatusCode::UNAUTHORIZED {
            return Err(AdminError::auth(format!(
                "Admin API rejected the token (401): {body}"
            )));
        }
        Err(AdminError::unexpected_status(operation, status.as_u16(), body))
    }
}

impl IdentityAdmin for RestAdminClient {
    type Error = AdminError;

    /// `POST /users`; the new id comes back in the `Location` header.
    async fn create_user(&self, user: &UserRepresentation) -> AdminResult<String> {
        let url = format!("{}/users", self.admin_base);
        debug!("admin POST {url}");
        let builder = self.token_source.apply(self.http_client.post(&url)).await?;
        let response = builder.json(user).send().await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            return self.error_from("create user", response).await;
        }

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AdminError::MissingCreatedId)?;
        let id = location
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or(AdminError::MissingCreatedId)?;
        Ok(id.to_string())
    }

    /// `GET /users?search={email}&first=0&max=1`.
    async fn find_user_by_email(&self, email: &str) -> AdminResult<Option<UserRepresentation>> {
        let url = format!("{}/users", self.admin_base);
        let users: Vec<UserRepresentation> = self
            .get_json(
                "search users",
                &url,
                &[("search", email), ("first", "0"), ("max", "1")],
            )
            .await?;
        Ok(users.into_iter().next())
    }

    /// `PUT /users/{id}`.
    async fn update_user(&self, id: &str, user: &UserRepresentation) -> AdminResult<()> {
        let url = format!("{}/users/{id}", self.admin_base);
        debug!("admin PUT {url}");
        self.expect_no_content("update user", self.http_client.put(&url), Some(user))
            .await
    }

    /// `DELETE /users/{id}`.
    async fn delete_user(&self, id: &str) -> AdminResult<()> {
        let url = format!("{}/users/{id}", self.admin_base);
        debug!("admin DELETE {url}");
        self.expect_no_content::<()>("delete user", self.http_client.delete(&url), None)
            .await
    }

    /// `POST /users/{id}/federated-identity/{alias}`.
    async fn add_federated_identity(
        &self,
        user_id: &str,
        link: &FederatedIdentityLink,
    ) -> AdminResult<()> {
        let alias = link.identity_provider.as_deref().ok_or_else(|| {
            AdminError::invalid_config("federated-identity link has no provider alias")
        })?;
        let url = format!("{}/users/{user_id}/federated-identity/{alias}", self.admin_base);
        debug!("admin POST {url}");
        self.expect_no_content("add federated identity", self.http_client.post(&url), Some(link))
            .await
    }

    /// `GET /users/{id}/federated-identity`.
    async fn federated_identities(&self, user_id: &str) -> AdminResult<Vec<FederatedIdentityLink>> {
        let url = format!("{}/users/{user_id}/federated-identity", self.admin_base);
        self.get_json("list federated identities", &url, &[]).await
    }

    /// `DELETE /users/{id}/federated-identity/{alias}`.
    async fn remove_federated_identity(
        &self,
        user_id: &str,
        provider_alias: &str,
    ) -> AdminResult<()> {
        let url = format!(
            "{}/users/{user_id}/federated-identity/{provider_alias}",
            self.admin_base
        );
        debug!("admin DELETE {url}");
        self.expect_no_content::<()>(
            "remove federated identity",
            self.http_client.delete(&url),
            None,
        )
        .await
    }
}
