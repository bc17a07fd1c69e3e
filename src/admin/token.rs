//! Admin access tokens via the resource-owner password grant.
//!
//! The admin REST API is authenticated with a bearer token obtained from the
//! server's `master` realm token endpoint using the `admin-cli` public client.
//! Tokens are cached until shortly before expiry and the cache is dropped on
//! 401 so the next call re-authenticates.

use crate::error::{AdminError, AdminResult};
use log::debug;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Public client id used for admin credential grants.
pub const ADMIN_CLI_CLIENT_ID: &str = "admin-cli";

/// Credentials for the admin account.
///
/// The [`Debug`] impl redacts the password to keep it out of log output.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() >= expires_at,
            None => false,
        }
    }
}

/// Token source for one identity server.
///
/// Cheap to clone; the token cache is shared across clones.
#[derive(Debug, Clone)]
pub struct AdminTokenSource {
    token_endpoint: String,
    credentials: AdminCredentials,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    http_client: reqwest::Client,
}

impl AdminTokenSource {
    /// Create a token source for the server rooted at `base_url`.
    ///
    /// `base_url` is the route URL without the `/auth` suffix.
    pub fn new(
        base_url: &str,
        credentials: AdminCredentials,
        http_client: reqwest::Client,
    ) -> Self {
        let token_endpoint = format!(
            "{}/auth/realms/master/protocol/openid-connect/token",
            base_url.trim_end_matches('/')
        );
        Self {
            token_endpoint,
            credentials,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Get a bearer token, fetching a fresh one when the cache is stale.
    pub async fn bearer_token(&self) -> AdminResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        debug!("Fetching admin access token from {}", self.token_endpoint);
        let form = [
            ("grant_type", "password"),
            ("client_id", ADMIN_CLI_CLIENT_ID),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| AdminError::auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(AdminError::auth(format!(
                "Token endpoint returned {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AdminError::auth(format!("Failed to parse token response: {e}")))?;

        // Expire 30 seconds early to avoid sending a token that dies in flight.
        let expires_at = token_response
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs.saturating_sub(30)));

        let access_token = token_response.access_token.clone();
        {
            let mut cache = self.cached_token.write().await;
            *cache = Some(CachedToken {
                access_token: token_response.access_token,
                expires_at,
            });
        }

        Ok(access_token)
    }

    /// Apply a bearer token to a request builder.
    pub async fn apply(&self, builder: reqwest::RequestBuilder) -> AdminResult<reqwest::RequestBuilder> {
        let token = self.bearer_token().await?;
        Ok(builder.bearer_auth(token))
    }

    /// Drop the cached token (called on 401 responses).
    pub async fn invalidate(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }
}
