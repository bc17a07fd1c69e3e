//! Error types for the cross-cluster harness.
//!
//! Each concern carries its own `thiserror` enum: configuration loading,
//! admin REST calls, and scenario verification. Result aliases are provided
//! for convenience.

use crate::site::Site;

/// Errors raised while locating, reading, or interpreting the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file missing or unreadable
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// A required key was absent after parsing
    #[error("Required config key '{key}' is missing")]
    MissingKey { key: String },

    /// A `$NAME` reference pointed at a key not yet defined
    #[error("Unresolved substitution '${name}' on line {line}")]
    UnresolvedSubstitution { name: String, line: usize },

    /// No cluster site left enabled after applying toggles
    #[error("All cluster sites are disabled; nothing to check")]
    NoSitesEnabled,

    /// Enabled site has no base URL configured
    #[error("Site '{site}' is enabled but has no base URL configured")]
    MissingSiteUrl { site: Site },
}

/// Errors raised by the admin REST client.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Transport-level failure (connect, TLS, timeout)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Token endpoint rejected the credential grant
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Server answered with a status the operation does not accept
    #[error("Unexpected status {status} from {operation}: {body}")]
    UnexpectedStatus {
        operation: String,
        status: u16,
        body: String,
    },

    /// Create response carried no usable Location header
    #[error("Create response missing a Location header with the new user id")]
    MissingCreatedId,

    /// Response body did not decode as the expected JSON shape
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client-side misconfiguration (bad base URL, unbuildable client)
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while running the replication scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// An admin operation failed on some site
    #[error("Admin operation failed on site '{site}': {source}")]
    Admin {
        site: Site,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Observed state on a site diverged from the expected replicated state
    #[error("Replication mismatch on site '{site}' for user '{email}': {detail}")]
    Mismatch {
        site: Site,
        email: String,
        detail: String,
    },
}

impl AdminError {
    /// Create an unexpected-status error.
    pub fn unexpected_status(
        operation: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::UnexpectedStatus {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create an invalid-configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

impl ScenarioError {
    /// Wrap a site-specific admin failure.
    pub fn admin<E>(site: Site, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Admin {
            site,
            source: Box::new(source),
        }
    }

    /// Create a replication mismatch error.
    pub fn mismatch(site: Site, email: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Mismatch {
            site,
            email: email.into(),
            detail: detail.into(),
        }
    }
}

/// Top-level error for harness wiring and the CLI.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

// Result type aliases for convenience
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type AdminResult<T> = Result<T, AdminError>;
pub type ScenarioResult<T> = Result<T, ScenarioError>;
pub type HarnessResult<T> = Result<T, HarnessError>;
