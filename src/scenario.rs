//! The cross-cluster replication scenario.
//!
//! One run walks a fixed sequence against every enabled site: create one user
//! per site, verify every user is visible on every site, update names and
//! attach a federated-identity link, verify the updated state replicated,
//! delete the users, and verify they are gone everywhere.
//!
//! The scenario is generic over [`IdentityAdmin`], so the same sequence runs
//! against live clusters and against in-memory fakes in tests. Calls are
//! sequential and nothing is retried; the first divergence or admin failure
//! aborts the run.

use crate::admin::{FederatedIdentityLink, IdentityAdmin, UserRepresentation};
use crate::error::{ScenarioError, ScenarioResult};
use crate::site::Site;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::fmt;
use uuid::Uuid;

/// Tunables for one scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioOptions {
    /// Local part prefix of scenario user emails (`{prefix}-{site}@{domain}`).
    pub user_prefix: String,
    /// Mail domain of scenario user emails.
    pub mail_domain: String,
    /// Identity-provider alias for the federated link, also prefixes the
    /// external id and username.
    pub provider_alias: String,
    /// First name written in the update phase.
    pub first_name: String,
    /// Require created ids shaped `f:…:{email}` (federated user storage).
    pub require_federated_id_format: bool,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            user_prefix: "test".to_string(),
            mail_domain: "example.com".to_string(),
            provider_alias: "google".to_string(),
            first_name: "Test".to_string(),
            require_federated_id_format: false,
        }
    }
}

/// What a completed step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Created,
    VerifiedCreated,
    Updated,
    VerifiedUpdated,
    Deleted,
    VerifiedDeleted,
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StepAction::Created => "created",
            StepAction::VerifiedCreated => "verified created",
            StepAction::Updated => "updated",
            StepAction::VerifiedUpdated => "verified updated",
            StepAction::Deleted => "deleted",
            StepAction::VerifiedDeleted => "verified deleted",
        };
        f.write_str(text)
    }
}

/// One completed step of a run.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Site the step ran against.
    pub site: Site,
    pub action: StepAction,
    /// Email of the scenario user the step concerned.
    pub email: String,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub steps: Vec<StepRecord>,
}

impl ScenarioReport {
    /// Number of completed steps with the given action.
    pub fn count(&self, action: StepAction) -> usize {
        self.steps.iter().filter(|s| s.action == action).count()
    }
}

/// The replication scenario over a set of enabled sites.
pub struct ReplicationScenario<A> {
    sites: Vec<(Site, A)>,
    options: ScenarioOptions,
}

impl<A: IdentityAdmin> ReplicationScenario<A> {
    /// Build a scenario over the enabled sites, in the order given.
    pub fn new(sites: Vec<(Site, A)>, options: ScenarioOptions) -> Self {
        Self { sites, options }
    }

    /// Email of the scenario user owned by `site`.
    pub fn email_for(&self, site: Site) -> String {
        format!(
            "{}-{}@{}",
            self.options.user_prefix, site, self.options.mail_domain
        )
    }

    /// Run the full sequence.
    pub async fn run(&self) -> ScenarioResult<ScenarioReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut steps = Vec::new();
        info!(
            "Starting replication run {} across {} site(s)",
            run_id,
            self.sites.len()
        );

        // Create one user per site, then check visibility everywhere.
        for (site, admin) in &self.sites {
            self.create_on(*site, admin).await?;
            steps.push(self.record(*site, StepAction::Created, *site));
        }
        self.verify_everywhere(&mut steps, StepAction::VerifiedCreated, |owner| {
            ExpectedUser::freshly_created(self.email_for(owner))
        })
        .await?;

        // Update names, attach the federated link, check again.
        for (site, admin) in &self.sites {
            self.update_on(*site, admin).await?;
            steps.push(self.record(*site, StepAction::Updated, *site));
        }
        self.verify_everywhere(&mut steps, StepAction::VerifiedUpdated, |owner| {
            ExpectedUser::updated(
                self.email_for(owner),
                self.options.first_name.clone(),
                owner.capitalized().to_string(),
                format!("{}-{}-id", self.options.provider_alias, owner),
            )
        })
        .await?;

        // Delete the users, check they are gone everywhere.
        for (site, admin) in &self.sites {
            self.delete_on(*site, admin).await?;
            steps.push(self.record(*site, StepAction::Deleted, *site));
        }
        for (owner, _) in &self.sites {
            let email = self.email_for(*owner);
            for (observer, admin) in self.observers_starting_with(*owner) {
                let found = admin
                    .find_user_by_email(&email)
                    .await
                    .map_err(|e| ScenarioError::admin(observer, e))?;
                if found.is_some() {
                    return Err(ScenarioError::mismatch(
                        observer,
                        &email,
                        "user still present after delete",
                    ));
                }
                info!("Verified '{email}' absent on {observer}");
                steps.push(self.record(observer, StepAction::VerifiedDeleted, *owner));
            }
        }

        let report = ScenarioReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            steps,
        };
        info!(
            "Replication run {} finished: {} step(s) completed",
            run_id,
            report.steps.len()
        );
        Ok(report)
    }

    fn record(&self, site: Site, action: StepAction, owner: Site) -> StepRecord {
        StepRecord {
            site,
            action,
            email: self.email_for(owner),
        }
    }

    /// The owner's entry first, then every other enabled site in order.
    fn observers_starting_with(&self, owner: Site) -> impl Iterator<Item = (Site, &A)> {
        let first = self
            .sites
            .iter()
            .filter(move |(site, _)| *site == owner)
            .map(|(site, admin)| (*site, admin));
        let rest = self
            .sites
            .iter()
            .filter(move |(site, _)| *site != owner)
            .map(|(site, admin)| (*site, admin));
        first.chain(rest)
    }

    async fn create_on(&self, site: Site, admin: &A) -> ScenarioResult<()> {
        let email = self.email_for(site);

        // A leftover user from an aborted earlier run is removed first.
        if let Some(existing) = admin
            .find_user_by_email(&email)
            .await
            .map_err(|e| ScenarioError::admin(site, e))?
        {
            if let Some(id) = existing.id.as_deref() {
                debug!("Removing leftover user '{email}' on {site}");
                admin
                    .delete_user(id)
                    .await
                    .map_err(|e| ScenarioError::admin(site, e))?;
            }
        }

        let user = UserRepresentation::new_enabled(&email);
        let id = admin
            .create_user(&user)
            .await
            .map_err(|e| ScenarioError::admin(site, e))?;

        if self.options.require_federated_id_format
            && !(id.starts_with("f:") && id.ends_with(&format!(":{email}")))
        {
            return Err(ScenarioError::mismatch(
                site,
                &email,
                format!("created id '{id}' is not a federated-storage id"),
            ));
        }

        info!("Created user '{email}' on {site} (id {id})");
        Ok(())
    }

    async fn update_on(&self, site: Site, admin: &A) -> ScenarioResult<()> {
        let email = self.email_for(site);
        let mut user = admin
            .find_user_by_email(&email)
            .await
            .map_err(|e| ScenarioError::admin(site, e))?
            .ok_or_else(|| {
                ScenarioError::mismatch(site, &email, "user vanished before update")
            })?;
        let id = user.id.clone().ok_or_else(|| {
            ScenarioError::mismatch(site, &email, "server returned a user without an id")
        })?;

        user.first_name = Some(self.options.first_name.clone());
        user.last_name = Some(site.capitalized().to_string());
        admin
            .update_user(&id, &user)
            .await
            .map_err(|e| ScenarioError::admin(site, e))?;

        let alias = &self.options.provider_alias;
        let link = FederatedIdentityLink::new(
            alias.clone(),
            format!("{alias}-{site}-id"),
            format!("{alias}-{site}-username"),
        );
        admin
            .add_federated_identity(&id, &link)
            .await
            .map_err(|e| ScenarioError::admin(site, e))?;

        info!("Updated user '{email}' on {site}");
        Ok(())
    }

    async fn delete_on(&self, site: Site, admin: &A) -> ScenarioResult<()> {
        let email = self.email_for(site);
        let user = admin
            .find_user_by_email(&email)
            .await
            .map_err(|e| ScenarioError::admin(site, e))?
            .ok_or_else(|| {
                ScenarioError::mismatch(site, &email, "user vanished before delete")
            })?;
        let id = user.id.as_deref().ok_or_else(|| {
            ScenarioError::mismatch(site, &email, "server returned a user without an id")
        })?;
        admin
            .delete_user(id)
            .await
            .map_err(|e| ScenarioError::admin(site, e))?;
        info!("Removed user '{email}' on {site}");
        Ok(())
    }

    async fn verify_everywhere(
        &self,
        steps: &mut Vec<StepRecord>,
        action: StepAction,
        expected_for: impl Fn(Site) -> ExpectedUser,
    ) -> ScenarioResult<()> {
        for (owner, _) in &self.sites {
            let expected = expected_for(*owner);
            for (observer, admin) in self.observers_starting_with(*owner) {
                self.verify_on(observer, admin, &expected).await?;
                steps.push(self.record(observer, action, *owner));
            }
        }
        Ok(())
    }

    async fn verify_on(
        &self,
        site: Site,
        admin: &A,
        expected: &ExpectedUser,
    ) -> ScenarioResult<()> {
        let email = &expected.email;
        let user = admin
            .find_user_by_email(email)
            .await
            .map_err(|e| ScenarioError::admin(site, e))?
            .ok_or_else(|| ScenarioError::mismatch(site, email, "user not found"))?;

        if user.username.as_deref() != Some(email.as_str()) {
            return Err(ScenarioError::mismatch(
                site,
                email,
                format!("username is {:?}, expected the email", user.username),
            ));
        }
        if user.email.as_deref() != Some(email.as_str()) {
            return Err(ScenarioError::mismatch(
                site,
                email,
                format!("email is {:?}", user.email),
            ));
        }
        if user.first_name != expected.first_name {
            return Err(ScenarioError::mismatch(
                site,
                email,
                format!(
                    "first name is {:?}, expected {:?}",
                    user.first_name, expected.first_name
                ),
            ));
        }
        if user.last_name != expected.last_name {
            return Err(ScenarioError::mismatch(
                site,
                email,
                format!(
                    "last name is {:?}, expected {:?}",
                    user.last_name, expected.last_name
                ),
            ));
        }

        let id = user.id.as_deref().ok_or_else(|| {
            ScenarioError::mismatch(site, email, "server returned a user without an id")
        })?;
        let links = admin
            .federated_identities(id)
            .await
            .map_err(|e| ScenarioError::admin(site, e))?;

        match &expected.federated_id {
            None => {
                if !links.is_empty() {
                    return Err(ScenarioError::mismatch(
                        site,
                        email,
                        format!("expected no federated links, found {}", links.len()),
                    ));
                }
            }
            Some(federated_id) => {
                if links.len() != 1 {
                    return Err(ScenarioError::mismatch(
                        site,
                        email,
                        format!("expected exactly one federated link, found {}", links.len()),
                    ));
                }
                let link = &links[0];
                if link.identity_provider.as_deref() != Some(self.options.provider_alias.as_str())
                {
                    return Err(ScenarioError::mismatch(
                        site,
                        email,
                        format!("link provider is {:?}", link.identity_provider),
                    ));
                }
                if link.user_id.as_deref() != Some(federated_id.as_str()) {
                    return Err(ScenarioError::mismatch(
                        site,
                        email,
                        format!(
                            "link external id is {:?}, expected '{federated_id}'",
                            link.user_id
                        ),
                    ));
                }
            }
        }

        info!("Verified user '{email}' on {site}");
        Ok(())
    }
}

/// Expected observable state of one scenario user during a verify phase.
struct ExpectedUser {
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    federated_id: Option<String>,
}

impl ExpectedUser {
    fn freshly_created(email: String) -> Self {
        Self {
            email,
            first_name: None,
            last_name: None,
            federated_id: None,
        }
    }

    fn updated(email: String, first_name: String, last_name: String, federated_id: String) -> Self {
        Self {
            email,
            first_name: Some(first_name),
            last_name: Some(last_name),
            federated_id: Some(federated_id),
        }
    }
}
