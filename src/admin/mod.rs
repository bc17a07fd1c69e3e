//! Admin-API access for the harness.
//!
//! [`IdentityAdmin`] is the seam between the replication scenario and a
//! concrete identity server: the scenario only ever talks through this trait,
//! so it runs identically against the live REST implementation
//! ([`RestAdminClient`]) and against in-memory fakes in tests.
//!
//! All operations target a single realm fixed at client construction; the
//! scenario never crosses realms.

pub mod representations;
pub mod rest;
pub mod token;

pub use representations::{FederatedIdentityLink, UserRepresentation};
pub use rest::{ClientOptions, RestAdminClient};
pub use token::{ADMIN_CLI_CLIENT_ID, AdminCredentials, AdminTokenSource};

use std::future::Future;

/// User CRUD and federated-identity operations against one cluster site.
///
/// Methods mirror the server's admin REST API one-to-one; none of them retry
/// or recover, failures surface as the implementation's error type.
pub trait IdentityAdmin {
    /// Error type returned by all operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a user and return the server-assigned id.
    fn create_user(
        &self,
        user: &UserRepresentation,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Find a user by email, `None` when no user matches.
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<UserRepresentation>, Self::Error>> + Send;

    /// Replace the stored user with `user`.
    fn update_user(
        &self,
        id: &str,
        user: &UserRepresentation,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Delete a user by id.
    fn delete_user(&self, id: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Attach a federated-identity link to a user.
    fn add_federated_identity(
        &self,
        user_id: &str,
        link: &FederatedIdentityLink,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// List a user's federated-identity links.
    fn federated_identities(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<FederatedIdentityLink>, Self::Error>> + Send;

    /// Remove the federated-identity link for one provider alias.
    fn remove_federated_identity(
        &self,
        user_id: &str,
        provider_alias: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
