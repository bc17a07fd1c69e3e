//! Shared test fixtures: an in-memory multi-site identity directory.
//!
//! [`FakeCluster`] hands out one [`InMemoryAdmin`] per site. In replicated
//! mode all sites share one directory, modeling a healthy deployment where
//! every write is immediately visible everywhere. In partitioned mode each
//! site gets its own directory, modeling broken replication.

use idm_crosscheck::admin::{FederatedIdentityLink, IdentityAdmin, UserRepresentation};
use idm_crosscheck::site::Site;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum FakeAdminError {
    #[error("no user with id '{0}'")]
    NotFound(String),
    #[error("user payload has no username")]
    MissingUsername,
}

#[derive(Debug, Clone, Default)]
struct StoredUser {
    user: UserRepresentation,
    links: Vec<FederatedIdentityLink>,
}

type Directory = Arc<RwLock<HashMap<String, StoredUser>>>;

/// Admin handle for one site of the fake cluster.
#[derive(Clone)]
pub struct InMemoryAdmin {
    directory: Directory,
    /// Generate plain ids instead of federated-storage `f:…:{username}` ids.
    plain_ids: bool,
}

/// A set of fake sites backed by shared or isolated directories.
pub struct FakeCluster;

impl FakeCluster {
    /// Sites sharing one directory: every write replicates instantly.
    pub fn replicated(sites: &[Site]) -> Vec<(Site, InMemoryAdmin)> {
        let directory: Directory = Arc::new(RwLock::new(HashMap::new()));
        sites
            .iter()
            .map(|site| {
                (
                    *site,
                    InMemoryAdmin {
                        directory: Arc::clone(&directory),
                        plain_ids: false,
                    },
                )
            })
            .collect()
    }

    /// Sites with isolated directories: nothing replicates.
    pub fn partitioned(sites: &[Site]) -> Vec<(Site, InMemoryAdmin)> {
        sites
            .iter()
            .map(|site| {
                (
                    *site,
                    InMemoryAdmin {
                        directory: Arc::new(RwLock::new(HashMap::new())),
                        plain_ids: false,
                    },
                )
            })
            .collect()
    }

    /// Replicated sites whose created ids are plain uuids.
    pub fn replicated_with_plain_ids(sites: &[Site]) -> Vec<(Site, InMemoryAdmin)> {
        let mut cluster = Self::replicated(sites);
        for (_, admin) in &mut cluster {
            admin.plain_ids = true;
        }
        cluster
    }
}

impl InMemoryAdmin {
    /// Number of stored users, for end-of-run assertions.
    pub async fn user_count(&self) -> usize {
        self.directory.read().await.len()
    }

    /// Insert a user directly, bypassing the admin API (leftover-state setup).
    pub async fn seed_user(&self, email: &str) -> String {
        let id = format!("f:{}:{email}", Uuid::new_v4());
        let mut user = UserRepresentation::new_enabled(email);
        user.id = Some(id.clone());
        self.directory.write().await.insert(
            id.clone(),
            StoredUser {
                user,
                links: Vec::new(),
            },
        );
        id
    }
}

impl IdentityAdmin for InMemoryAdmin {
    type Error = FakeAdminError;

    async fn create_user(&self, user: &UserRepresentation) -> Result<String, Self::Error> {
        let username = user
            .username
            .clone()
            .ok_or(FakeAdminError::MissingUsername)?;
        let id = if self.plain_ids {
            Uuid::new_v4().to_string()
        } else {
            format!("f:{}:{username}", Uuid::new_v4())
        };

        let mut stored = StoredUser {
            user: user.clone(),
            links: Vec::new(),
        };
        stored.user.id = Some(id.clone());
        self.directory.write().await.insert(id.clone(), stored);
        Ok(id)
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserRepresentation>, Self::Error> {
        let directory = self.directory.read().await;
        Ok(directory
            .values()
            .find(|stored| stored.user.email.as_deref() == Some(email))
            .map(|stored| stored.user.clone()))
    }

    async fn update_user(&self, id: &str, user: &UserRepresentation) -> Result<(), Self::Error> {
        let mut directory = self.directory.write().await;
        let stored = directory
            .get_mut(id)
            .ok_or_else(|| FakeAdminError::NotFound(id.to_string()))?;
        stored.user = user.clone();
        stored.user.id = Some(id.to_string());
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), Self::Error> {
        self.directory
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| FakeAdminError::NotFound(id.to_string()))
    }

    async fn add_federated_identity(
        &self,
        user_id: &str,
        link: &FederatedIdentityLink,
    ) -> Result<(), Self::Error> {
        let mut directory = self.directory.write().await;
        let stored = directory
            .get_mut(user_id)
            .ok_or_else(|| FakeAdminError::NotFound(user_id.to_string()))?;
        stored.links.push(link.clone());
        Ok(())
    }

    async fn federated_identities(
        &self,
        user_id: &str,
    ) -> Result<Vec<FederatedIdentityLink>, Self::Error> {
        let directory = self.directory.read().await;
        let stored = directory
            .get(user_id)
            .ok_or_else(|| FakeAdminError::NotFound(user_id.to_string()))?;
        Ok(stored.links.clone())
    }

    async fn remove_federated_identity(
        &self,
        user_id: &str,
        provider_alias: &str,
    ) -> Result<(), Self::Error> {
        let mut directory = self.directory.write().await;
        let stored = directory
            .get_mut(user_id)
            .ok_or_else(|| FakeAdminError::NotFound(user_id.to_string()))?;
        stored
            .links
            .retain(|link| link.identity_provider.as_deref() != Some(provider_alias));
        Ok(())
    }
}
