//! Config-file loading for the harness.
//!
//! The deployment ships a shell-style config file consisting of
//! `export NAME=value` lines. Values may reference previously defined keys as
//! `$NAME` (the deployment file uses this for `$PROJECT`), may be wrapped in
//! double quotes, and may carry a trailing semicolon. This module parses that
//! format into a [`HarnessConfig`] and applies per-site enable toggles from
//! the environment.
//!
//! # Example
//!
//! ```rust
//! use idm_crosscheck::config::ConfigFile;
//!
//! let file = ConfigFile::parse_str(
//!     "export PROJECT=summit-demo\n\
//!      export ADMIN_PASS=\"hunter2\";\n\
//!      export AWS_SSO_URL=\"https://sso.$PROJECT.example.com\"\n",
//! ).unwrap();
//! assert_eq!(file.get("AWS_SSO_URL"), Some("https://sso.summit-demo.example.com"));
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::site::Site;
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

/// Config key naming the deployment project.
pub const KEY_PROJECT: &str = "PROJECT";
/// Config key holding the shared admin password.
pub const KEY_ADMIN_PASS: &str = "ADMIN_PASS";
/// Optional config key overriding the realm under test.
pub const KEY_REALM: &str = "REALM";

/// Realm used when the config file does not name one.
pub const DEFAULT_REALM: &str = "summit";
/// Admin account used for the credential grant.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// A parsed shell-style config file: flat string key/value pairs.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    props: HashMap<String, String>,
}

impl ConfigFile {
    /// Read and parse a config file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Reading config file {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::parse_str(&contents)
    }

    /// Parse config-file contents.
    ///
    /// Lines without `=`, blank lines, and `#` comments are skipped. A leading
    /// `export ` keyword is stripped. Later definitions shadow earlier ones.
    pub fn parse_str(contents: &str) -> ConfigResult<Self> {
        let mut props: HashMap<String, String> = HashMap::new();

        for (index, raw_line) in contents.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(eq) = line.find('=') else {
                continue;
            };

            let name = line[..eq]
                .trim()
                .strip_prefix("export ")
                .unwrap_or(line[..eq].trim())
                .trim()
                .to_string();
            if name.is_empty() {
                continue;
            }

            let mut value = line[eq + 1..].trim().to_string();
            value = strip_decorations(&value);
            value = substitute(&value, &props, line_number)?;

            props.insert(name, value);
        }

        Ok(Self { props })
    }

    /// Look up a parsed value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    /// Look up a value that must be present.
    pub fn require(&self, key: &str) -> ConfigResult<&str> {
        self.get(key).ok_or_else(|| ConfigError::MissingKey {
            key: key.to_string(),
        })
    }

    /// Number of parsed keys.
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Whether no keys were parsed.
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

/// Strip a trailing `;` and one layer of surrounding double quotes.
fn strip_decorations(value: &str) -> String {
    let value = value.strip_suffix(';').unwrap_or(value).trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

/// Replace `$NAME` references with previously defined values.
fn substitute(
    value: &str,
    props: &HashMap<String, String>,
    line_number: usize,
) -> ConfigResult<String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let mut name = String::new();
        while let Some(&(_, next)) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }

        if name.is_empty() {
            // A lone '$' is kept literally.
            out.push('$');
            continue;
        }

        match props.get(&name) {
            Some(resolved) => out.push_str(resolved),
            None => {
                return Err(ConfigError::UnresolvedSubstitution {
                    name,
                    line: line_number,
                });
            }
        }
    }

    Ok(out)
}

/// Per-site connection settings.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Route URL of the site's identity server, if configured.
    pub base_url: Option<String>,
    /// Whether this site takes part in the run.
    pub enabled: bool,
}

/// Everything the harness needs for one run.
#[derive(Clone)]
pub struct HarnessConfig {
    /// Deployment project name (from `PROJECT`).
    pub project: String,
    /// Shared admin password (redacted in Debug output).
    pub admin_password: String,
    /// Admin account username for the credential grant.
    pub admin_username: String,
    /// Realm holding the scenario users.
    pub realm: String,
    /// Per-site settings, keyed in canonical site order.
    pub sites: BTreeMap<Site, SiteConfig>,
}

impl HarnessConfig {
    /// Load the harness config from a config file on disk.
    ///
    /// All sites start enabled; call [`HarnessConfig::apply_env_toggles`] to
    /// honor `TEST_AWS` / `TEST_AZR` / `TEST_GCE`.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let file = ConfigFile::from_file(path)?;
        Self::from_config_file(&file)
    }

    /// Build the harness config from already-parsed key/value pairs.
    pub fn from_config_file(file: &ConfigFile) -> ConfigResult<Self> {
        let project = file.require(KEY_PROJECT)?.to_string();
        let admin_password = file.require(KEY_ADMIN_PASS)?.to_string();
        let realm = file.get(KEY_REALM).unwrap_or(DEFAULT_REALM).to_string();

        let mut sites = BTreeMap::new();
        for site in Site::ALL {
            sites.insert(
                site,
                SiteConfig {
                    base_url: file.get(site.url_config_key()).map(str::to_string),
                    enabled: true,
                },
            );
        }

        Ok(Self {
            project,
            admin_password,
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            realm,
            sites,
        })
    }

    /// Disable sites whose toggle env var is set to anything but `true`.
    ///
    /// Unset variables leave the site enabled, so a plain run checks all
    /// three clusters and `TEST_AZR=false` skips one.
    pub fn apply_env_toggles(&mut self) {
        for (site, site_config) in &mut self.sites {
            if let Ok(value) = std::env::var(site.toggle_env_var()) {
                site_config.enabled = value.eq_ignore_ascii_case("true");
                if !site_config.enabled {
                    info!("Site '{}' disabled via {}", site, site.toggle_env_var());
                }
            }
        }
    }

    /// Enabled sites with their base URLs, in canonical order.
    ///
    /// Fails when nothing is enabled or an enabled site lacks a URL.
    pub fn enabled_sites(&self) -> ConfigResult<Vec<(Site, &str)>> {
        let mut enabled = Vec::new();
        for (site, site_config) in &self.sites {
            if !site_config.enabled {
                continue;
            }
            match &site_config.base_url {
                Some(url) => enabled.push((*site, url.as_str())),
                None => return Err(ConfigError::MissingSiteUrl { site: *site }),
            }
        }
        if enabled.is_empty() {
            return Err(ConfigError::NoSitesEnabled);
        }
        Ok(enabled)
    }
}

impl fmt::Debug for HarnessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("project", &self.project)
            .field("admin_password", &"[REDACTED]")
            .field("admin_username", &self.admin_username)
            .field("realm", &self.realm)
            .field("sites", &self.sites)
            .finish()
    }
}
