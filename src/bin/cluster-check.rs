//! # Cluster replication checker
//!
//! Runs the user-replication scenario against the live clusters described by
//! a shell-style config file and reports each completed step.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin cluster-check -- /path/to/deploy/config
//! ```
//!
//! The path may also come from the `CLUSTER_CHECK_CONFIG` environment
//! variable. Sites are skipped with `TEST_AWS=false`, `TEST_AZR=false`, or
//! `TEST_GCE=false`; logging verbosity follows `RUST_LOG`.
//!
//! ## Output
//!
//! ```text
//! Loaded config for project 'summit-demo' (realm 'summit', 3 site(s) enabled)
//! ✓ Replication run 2f0c… completed
//!
//! Step summary:
//!   created:           3
//!   verified created:  9
//!   updated:           3
//!   verified updated:  9
//!   deleted:           3
//!   verified deleted:  9
//! ```
//!
//! Exits non-zero on any mismatch or admin-API failure; the first failure
//! aborts the remaining steps.

use idm_crosscheck::admin::ClientOptions;
use idm_crosscheck::config::HarnessConfig;
use idm_crosscheck::harness::build_scenario;
use idm_crosscheck::scenario::{ScenarioOptions, StepAction};

const CONFIG_ENV_VAR: &str = "CLUSTER_CHECK_CONFIG";

#[tokio::main]
async fn main() {
    env_logger::init();

    let config_path = match std::env::args().nth(1).or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
    {
        Some(path) => path,
        None => {
            eprintln!("Usage: cluster-check <config-file>");
            eprintln!("(or set {CONFIG_ENV_VAR})");
            std::process::exit(2);
        }
    };

    let mut config = match HarnessConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config from {config_path}: {e}");
            std::process::exit(2);
        }
    };
    config.apply_env_toggles();

    let enabled = match config.enabled_sites() {
        Ok(enabled) => enabled.len(),
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(2);
        }
    };
    println!(
        "Loaded config for project '{}' (realm '{}', {} site(s) enabled)",
        config.project, config.realm, enabled
    );

    let scenario = match build_scenario(
        &config,
        &ClientOptions::default(),
        ScenarioOptions::default(),
    ) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("❌ Failed to build admin clients: {e}");
            std::process::exit(2);
        }
    };

    match scenario.run().await {
        Ok(report) => {
            println!("✓ Replication run {} completed", report.run_id);
            println!();
            println!("Step summary:");
            println!("  created:           {}", report.count(StepAction::Created));
            println!(
                "  verified created:  {}",
                report.count(StepAction::VerifiedCreated)
            );
            println!("  updated:           {}", report.count(StepAction::Updated));
            println!(
                "  verified updated:  {}",
                report.count(StepAction::VerifiedUpdated)
            );
            println!("  deleted:           {}", report.count(StepAction::Deleted));
            println!(
                "  verified deleted:  {}",
                report.count(StepAction::VerifiedDeleted)
            );
        }
        Err(e) => {
            eprintln!("❌ Replication check failed: {e}");
            std::process::exit(1);
        }
    }
}
