//! The admin service contract.

use async_trait::async_trait;
use cloudgate_platform_access::Session;
use std::collections::BTreeSet;

use crate::error::AdminError;
use crate::model::{AdminPermissionInfo, AdminRoleInfo, AdminUserInfo};

/// User, role, and permission administration.
///
/// Implementations do not check the caller's permissions; the requirements
/// in [`AdminOperation`](crate::AdminOperation) are enforced by the
/// dispatcher before any method is called.
#[async_trait]
pub trait AdminService: Send + Sync {
    /// Lists users ordered by id, or only the user named `user_id`.
    async fn list_users(
        &self,
        session: &Session,
        user_id: Option<&str>,
    ) -> Result<Vec<AdminUserInfo>, AdminError>;

    /// Lists roles ordered by id, or only the role named `role_id`.
    async fn list_roles(
        &self,
        session: &Session,
        role_id: Option<&str>,
    ) -> Result<Vec<AdminRoleInfo>, AdminError>;

    /// Lists the permission catalog.
    async fn list_permissions(
        &self,
        session: &Session,
    ) -> Result<Vec<AdminPermissionInfo>, AdminError>;

    async fn create_user(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<AdminUserInfo, AdminError>;

    async fn delete_user(&self, session: &Session, user_id: &str) -> Result<bool, AdminError>;

    async fn create_role(
        &self,
        session: &Session,
        role_id: &str,
    ) -> Result<AdminRoleInfo, AdminError>;

    /// Deletes a role and removes it from every user it was granted to.
    async fn delete_role(&self, session: &Session, role_id: &str) -> Result<bool, AdminError>;

    /// Grants a role to a user. Granting twice is not an error.
    async fn grant_user_role(
        &self,
        session: &Session,
        user_id: &str,
        role_id: &str,
    ) -> Result<bool, AdminError>;

    /// Revokes a role from a user. Revoking a role that was never granted is
    /// not an error.
    async fn revoke_user_role(
        &self,
        session: &Session,
        user_id: &str,
        role_id: &str,
    ) -> Result<bool, AdminError>;

    /// Replaces the full permission set of a role.
    async fn set_role_permissions(
        &self,
        session: &Session,
        role_id: &str,
        permissions: &BTreeSet<String>,
    ) -> Result<bool, AdminError>;
}
