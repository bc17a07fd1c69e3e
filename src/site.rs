//! Cluster site identifiers.
//!
//! Three independently deployed clusters take part in the replication check.
//! The lowercase labels feed into user emails, federated-identity ids, and
//! log lines, so they are stable API.

use std::fmt;

/// One of the deployed identity-management clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Site {
    Aws,
    Azr,
    Gce,
}

impl Site {
    /// All sites in canonical order.
    pub const ALL: [Site; 3] = [Site::Aws, Site::Azr, Site::Gce];

    /// Stable lowercase label ("aws", "azr", "gce").
    pub fn label(&self) -> &'static str {
        match self {
            Site::Aws => "aws",
            Site::Azr => "azr",
            Site::Gce => "gce",
        }
    }

    /// Label with the first letter uppercased, used as the scenario last name.
    pub fn capitalized(&self) -> &'static str {
        match self {
            Site::Aws => "Aws",
            Site::Azr => "Azr",
            Site::Gce => "Gce",
        }
    }

    /// Environment variable controlling whether this site takes part in a run.
    pub fn toggle_env_var(&self) -> &'static str {
        match self {
            Site::Aws => "TEST_AWS",
            Site::Azr => "TEST_AZR",
            Site::Gce => "TEST_GCE",
        }
    }

    /// Config key holding this site's base URL.
    pub fn url_config_key(&self) -> &'static str {
        match self {
            Site::Aws => "AWS_SSO_URL",
            Site::Azr => "AZR_SSO_URL",
            Site::Gce => "GCE_SSO_URL",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
