//! Wiring from a loaded config to a runnable scenario.
//!
//! This is the production path of the harness: one [`RestAdminClient`] per
//! enabled site, assembled into a [`ReplicationScenario`]. Tests bypass this
//! module and drive the scenario with in-memory admins instead.

use crate::admin::{AdminCredentials, ClientOptions, RestAdminClient};
use crate::config::HarnessConfig;
use crate::error::HarnessResult;
use crate::scenario::{ReplicationScenario, ScenarioOptions};
use crate::site::Site;
use log::info;

/// Build one REST admin client per enabled site.
pub fn build_clients(
    config: &HarnessConfig,
    options: &ClientOptions,
) -> HarnessResult<Vec<(Site, RestAdminClient)>> {
    let mut clients = Vec::new();
    for (site, base_url) in config.enabled_sites()? {
        info!("Building admin client for '{site}' at {base_url}");
        let credentials =
            AdminCredentials::new(config.admin_username.clone(), config.admin_password.clone());
        let client = RestAdminClient::new(base_url, &config.realm, credentials, options.clone())?;
        clients.push((site, client));
    }
    Ok(clients)
}

/// Build the full scenario from a loaded config.
pub fn build_scenario(
    config: &HarnessConfig,
    client_options: &ClientOptions,
    scenario_options: ScenarioOptions,
) -> HarnessResult<ReplicationScenario<RestAdminClient>> {
    let clients = build_clients(config, client_options)?;
    Ok(ReplicationScenario::new(clients, scenario_options))
}
