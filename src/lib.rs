//! Cross-cluster replication checker for identity-management admin APIs.
//!
//! Exercises user CRUD and federated-identity linking across independently
//! deployed identity-management clusters ("aws", "azr", "gce") and verifies
//! that writes on one cluster become visible as reads on the others.
//!
//! # Core Components
//!
//! - [`HarnessConfig`] - cluster endpoints and credentials from a shell-style
//!   config file, with per-site env toggles
//! - [`IdentityAdmin`] - trait over a cluster's admin API
//! - [`RestAdminClient`] - reqwest-based implementation for live clusters
//! - [`ReplicationScenario`] - the create/verify/update/verify/delete/verify
//!   sequence across all enabled sites
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use idm_crosscheck::admin::ClientOptions;
//! use idm_crosscheck::config::HarnessConfig;
//! use idm_crosscheck::harness::build_scenario;
//! use idm_crosscheck::scenario::ScenarioOptions;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = HarnessConfig::from_file("deploy/config")?;
//! config.apply_env_toggles();
//!
//! let scenario = build_scenario(
//!     &config,
//!     &ClientOptions::default(),
//!     ScenarioOptions::default(),
//! )?;
//! let report = scenario.run().await?;
//! println!("completed {} steps", report.steps.len());
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod config;
pub mod error;
pub mod harness;
pub mod scenario;
pub mod site;

// Re-export commonly used types for convenience
pub use admin::{
    AdminCredentials, ClientOptions, FederatedIdentityLink, IdentityAdmin, RestAdminClient,
    UserRepresentation,
};
pub use config::{ConfigFile, HarnessConfig};
pub use error::{
    AdminError, AdminResult, ConfigError, ConfigResult, HarnessError, HarnessResult,
    ScenarioError, ScenarioResult,
};
pub use scenario::{ReplicationScenario, ScenarioOptions, ScenarioReport, StepAction, StepRecord};
pub use site::Site;
