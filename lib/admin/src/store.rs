//! In-memory [`AdminService`].
//!
//! Users and roles live behind one lock so every operation sees and leaves
//! a consistent state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cloudgate_platform_access::Session;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::AdminError;
use crate::model::{AdminPermissionInfo, AdminRoleInfo, AdminUserInfo};
use crate::permission::PERMISSION_ADMIN;
use crate::service::AdminService;

/// Permission granted to every signed-in user.
pub const PERMISSION_PUBLIC: &str = "public";

const CATEGORY_PLATFORM: &str = "platform";
const CATEGORY_CUSTOM: &str = "custom";

#[derive(Debug, Clone)]
struct UserRecord {
    roles: BTreeSet<String>,
    enabled: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct RoleRecord {
    name: Option<String>,
    description: Option<String>,
    permissions: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct Directory {
    users: BTreeMap<String, UserRecord>,
    roles: BTreeMap<String, RoleRecord>,
}

impl Directory {
    fn user_info(user_id: &str, record: &UserRecord) -> AdminUserInfo {
        AdminUserInfo {
            user_id: user_id.to_string(),
            granted_roles: record.roles.iter().cloned().collect(),
            enabled: record.enabled,
            created_at: record.created_at,
        }
    }

    fn role_info(&self, role_id: &str, record: &RoleRecord) -> AdminRoleInfo {
        let granted_users = self
            .users
            .iter()
            .filter(|(_, user)| user.roles.contains(role_id))
            .map(|(user_id, _)| user_id.clone())
            .collect();
        AdminRoleInfo {
            role_id: role_id.to_string(),
            name: record.name.clone(),
            description: record.description.clone(),
            permissions: record.permissions.iter().cloned().collect(),
            granted_users,
        }
    }

    fn require_role(&self, role_id: &str) -> Result<(), AdminError> {
        if self.roles.contains_key(role_id) {
            Ok(())
        } else {
            Err(AdminError::RoleNotFound {
                role_id: role_id.to_string(),
            })
        }
    }

    fn user_mut(&mut self, user_id: &str) -> Result<&mut UserRecord, AdminError> {
        self.users
            .get_mut(user_id)
            .ok_or_else(|| AdminError::UserNotFound {
                user_id: user_id.to_string(),
            })
    }
}

/// Normalizes a user or role id the same way for every operation:
/// surrounding whitespace is dropped and blank ids are rejected.
fn validate_name(name: &str) -> Result<&str, AdminError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AdminError::InvalidName {
            name: name.to_string(),
            reason: "name must not be blank".to_string(),
        });
    }
    Ok(trimmed)
}

/// Admin service backed by process memory.
#[derive(Debug)]
pub struct InMemoryAdminService {
    directory: RwLock<Directory>,
    catalog: Vec<AdminPermissionInfo>,
}

impl Default for InMemoryAdminService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAdminService {
    /// Creates an empty store with the built-in permission catalog.
    #[must_use]
    pub fn new() -> Self {
        let catalog = vec![
            AdminPermissionInfo::new(PERMISSION_ADMIN, "Administration", CATEGORY_PLATFORM)
                .with_description("Manage users, roles, and permissions"),
            AdminPermissionInfo::new(PERMISSION_PUBLIC, "Public access", CATEGORY_PLATFORM)
                .with_description("Basic access for signed-in users"),
        ];
        Self {
            directory: RwLock::new(Directory::default()),
            catalog,
        }
    }

    /// Adds permission ids to the catalog. Ids already present are ignored.
    #[must_use]
    pub fn with_permissions<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            let id = id.into();
            if self.catalog.iter().any(|p| p.id == id) {
                continue;
            }
            self.catalog
                .push(AdminPermissionInfo::new(id.clone(), id, CATEGORY_CUSTOM));
        }
        self
    }

    fn is_known_permission(&self, id: &str) -> bool {
        self.catalog.iter().any(|p| p.id == id)
    }
}

#[async_trait]
impl AdminService for InMemoryAdminService {
    async fn list_users(
        &self,
        _session: &Session,
        user_id: Option<&str>,
    ) -> Result<Vec<AdminUserInfo>, AdminError> {
        let user_id = user_id.map(str::trim);
        let directory = self.directory.read().await;
        Ok(directory
            .users
            .iter()
            .filter(|(id, _)| user_id.is_none_or(|wanted| wanted == id.as_str()))
            .map(|(id, record)| Directory::user_info(id, record))
            .collect())
    }

    async fn list_roles(
        &self,
        _session: &Session,
        role_id: Option<&str>,
    ) -> Result<Vec<AdminRoleInfo>, AdminError> {
        let role_id = role_id.map(str::trim);
        let directory = self.directory.read().await;
        Ok(directory
            .roles
            .iter()
            .filter(|(id, _)| role_id.is_none_or(|wanted| wanted == id.as_str()))
            .map(|(id, record)| directory.role_info(id, record))
            .collect())
    }

    async fn list_permissions(
        &self,
        _session: &Session,
    ) -> Result<Vec<AdminPermissionInfo>, AdminError> {
        Ok(self.catalog.clone())
    }

    async fn create_user(
        &self,
        session: &Session,
        user_id: &str,
    ) -> Result<AdminUserInfo, AdminError> {
        let user_id = validate_name(user_id)?;
        let mut directory = self.directory.write().await;
        if directory.users.contains_key(user_id) {
            return Err(AdminError::UserAlreadyExists {
                user_id: user_id.to_string(),
            });
        }
        let record = UserRecord {
            roles: BTreeSet::new(),
            enabled: true,
            created_at: Utc::now(),
        };
        let info = Directory::user_info(user_id, &record);
        directory.users.insert(user_id.to_string(), record);
        info!(user_id, by = ?session.user_id(), "user created");
        Ok(info)
    }

    async fn delete_user(&self, session: &Session, user_id: &str) -> Result<bool, AdminError> {
        let user_id = validate_name(user_id)?;
        let mut directory = self.directory.write().await;
        if directory.users.remove(user_id).is_none() {
            return Err(AdminError::UserNotFound {
                user_id: user_id.to_string(),
            });
        }
        info!(user_id, by = ?session.user_id(), "user deleted");
        Ok(true)
    }

    async fn create_role(
        &self,
        session: &Session,
        role_id: &str,
    ) -> Result<AdminRoleInfo, AdminError> {
        let role_id = validate_name(role_id)?;
        let mut directory = self.directory.write().await;
        if directory.roles.contains_key(role_id) {
            return Err(AdminError::RoleAlreadyExists {
                role_id: role_id.to_string(),
            });
        }
        let record = RoleRecord::default();
        let info = directory.role_info(role_id, &record);
        directory.roles.insert(role_id.to_string(), record);
        info!(role_id, by = ?session.user_id(), "role created");
        Ok(info)
    }

    async fn delete_role(&self, session: &Session, role_id: &str) -> Result<bool, AdminError> {
        let role_id = validate_name(role_id)?;
        let mut directory = self.directory.write().await;
        if directory.roles.remove(role_id).is_none() {
            return Err(AdminError::RoleNotFound {
                role_id: role_id.to_string(),
            });
        }
        for user in directory.users.values_mut() {
            user.roles.remove(role_id);
        }
        info!(role_id, by = ?session.user_id(), "role deleted");
        Ok(true)
    }

    async fn grant_user_role(
        &self,
        session: &Session,
        user_id: &str,
        role_id: &str,
    ) -> Result<bool, AdminError> {
        let user_id = validate_name(user_id)?;
        let role_id = validate_name(role_id)?;
        let mut directory = self.directory.write().await;
        directory.require_role(role_id)?;
        directory.user_mut(user_id)?.roles.insert(role_id.to_string());
        info!(user_id, role_id, by = ?session.user_id(), "role granted");
        Ok(true)
    }

    async fn revoke_user_role(
        &self,
        session: &Session,
        user_id: &str,
        role_id: &str,
    ) -> Result<bool, AdminError> {
        let user_id = validate_name(user_id)?;
        let role_id = validate_name(role_id)?;
        let mut directory = self.directory.write().await;
        directory.require_role(role_id)?;
        directory.user_mut(user_id)?.roles.remove(role_id);
        info!(user_id, role_id, by = ?session.user_id(), "role revoked");
        Ok(true)
    }

    async fn set_role_permissions(
        &self,
        session: &Session,
        role_id: &str,
        permissions: &BTreeSet<String>,
    ) -> Result<bool, AdminError> {
        let role_id = validate_name(role_id)?;
        if let Some(unknown) = permissions.iter().find(|p| !self.is_known_permission(p)) {
            return Err(AdminError::UnknownPermission {
                permission: unknown.clone(),
            });
        }
        let mut directory = self.directory.write().await;
        let role = directory
            .roles
            .get_mut(role_id)
            .ok_or_else(|| AdminError::RoleNotFound {
                role_id: role_id.to_string(),
            })?;
        role.permissions.clone_from(permissions);
        info!(role_id, ?permissions, by = ?session.user_id(), "role permissions replaced");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudgate_core::SessionId;

    fn admin() -> Session {
        Session::authenticated(
            SessionId::new(),
            "root",
            [PERMISSION_ADMIN.to_string()],
        )
    }

    fn perms(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn create_and_list_users() {
        let store = InMemoryAdminService::new();
        let session = admin();
        store.create_user(&session, "bob").await.expect("create");
        store.create_user(&session, "alice").await.expect("create");

        let users = store.list_users(&session, None).await.expect("list");
        let ids: Vec<_> = users.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, vec!["alice", "bob"]);
        assert!(users.iter().all(|u| u.enabled));
    }

    #[tokio::test]
    async fn list_users_filter_is_exact() {
        let store = InMemoryAdminService::new();
        let session = admin();
        store.create_user(&session, "alice").await.expect("create");
        store.create_user(&session, "alicia").await.expect("create");

        let users = store.list_users(&session, Some("alice")).await.expect("list");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].user_id, "alice");

        let none = store.list_users(&session, Some("ali")).await.expect("list");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn duplicate_user_conflicts() {
        let store = InMemoryAdminService::new();
        let session = admin();
        store.create_user(&session, "alice").await.expect("create");
        let err = store.create_user(&session, "alice").await.expect_err("dup");
        assert_eq!(
            err,
            AdminError::UserAlreadyExists {
                user_id: "alice".to_string()
            }
        );
    }

    #[tokio::test]
    async fn blank_user_name_is_rejected() {
        let store = InMemoryAdminService::new();
        let err = store.create_user(&admin(), "   ").await.expect_err("blank");
        assert!(matches!(err, AdminError::InvalidName { .. }));
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let store = InMemoryAdminService::new();
        let err = store.delete_user(&admin(), "ghost").await.expect_err("missing");
        assert_eq!(
            err,
            AdminError::UserNotFound {
                user_id: "ghost".to_string()
            }
        );
    }

    #[tokio::test]
    async fn delete_user_removes_it() {
        let store = InMemoryAdminService::new();
        let session = admin();
        store.create_user(&session, "alice").await.expect("create");
        assert!(store.delete_user(&session, "alice").await.expect("delete"));
        assert!(store.list_users(&session, None).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn grant_and_revoke_roles() {
        let store = InMemoryAdminService::new();
        let session = admin();
        store.create_user(&session, "alice").await.expect("create");
        store.create_role(&session, "dba").await.expect("create");

        assert!(store.grant_user_role(&session, "alice", "dba").await.expect("grant"));
        assert!(store.grant_user_role(&session, "alice", "dba").await.expect("regrant"));

        let roles = store.list_roles(&session, Some("dba")).await.expect("list");
        assert_eq!(roles[0].granted_users, vec!["alice"]);
        let users = store.list_users(&session, Some("alice")).await.expect("list");
        assert_eq!(users[0].granted_roles, vec!["dba"]);

        assert!(store.revoke_user_role(&session, "alice", "dba").await.expect("revoke"));
        assert!(store.revoke_user_role(&session, "alice", "dba").await.expect("revoke again"));
        let users = store.list_users(&session, Some("alice")).await.expect("list");
        assert!(users[0].granted_roles.is_empty());
    }

    #[tokio::test]
    async fn grant_requires_existing_user_and_role() {
        let store = InMemoryAdminService::new();
        let session = admin();
        store.create_user(&session, "alice").await.expect("create");

        let err = store
            .grant_user_role(&session, "alice", "dba")
            .await
            .expect_err("no role");
        assert!(matches!(err, AdminError::RoleNotFound { .. }));

        store.create_role(&session, "dba").await.expect("create");
        let err = store
            .grant_user_role(&session, "bob", "dba")
            .await
            .expect_err("no user");
        assert!(matches!(err, AdminError::UserNotFound { .. }));
    }

    #[tokio::test]
    async fn delete_role_removes_grants() {
        let store = InMemoryAdminService::new();
        let session = admin();
        store.create_user(&session, "alice").await.expect("create");
        store.create_role(&session, "dba").await.expect("create");
        store
            .grant_user_role(&session, "alice", "dba")
            .await
            .expect("grant");

        assert!(store.delete_role(&session, "dba").await.expect("delete"));
        let users = store.list_users(&session, None).await.expect("list");
        assert!(users[0].granted_roles.is_empty());

        let err = store.delete_role(&session, "dba").await.expect_err("gone");
        assert!(matches!(err, AdminError::RoleNotFound { .. }));
    }

    #[tokio::test]
    async fn set_role_permissions_replaces_the_set() {
        let store = InMemoryAdminService::new().with_permissions(["reports"]);
        let session = admin();
        store.create_role(&session, "analyst").await.expect("create");

        store
            .set_role_permissions(&session, "analyst", &perms(&["public"]))
            .await
            .expect("first");
        store
            .set_role_permissions(&session, "analyst", &perms(&["reports"]))
            .await
            .expect("second");

        let roles = store.list_roles(&session, Some("analyst")).await.expect("list");
        assert_eq!(roles[0].permissions, vec!["reports"]);
    }

    #[tokio::test]
    async fn set_role_permissions_rejects_unknown_ids() {
        let store = InMemoryAdminService::new();
        let session = admin();
        store.create_role(&session, "analyst").await.expect("create");

        let err = store
            .set_role_permissions(&session, "analyst", &perms(&["fly"]))
            .await
            .expect_err("unknown");
        assert_eq!(
            err,
            AdminError::UnknownPermission {
                permission: "fly".to_string()
            }
        );
    }

    #[tokio::test]
    async fn set_role_permissions_on_missing_role() {
        let store = InMemoryAdminService::new();
        let err = store
            .set_role_permissions(&admin(), "ghost", &perms(&["admin"]))
            .await
            .expect_err("missing");
        assert!(matches!(err, AdminError::RoleNotFound { .. }));
    }

    #[tokio::test]
    async fn catalog_includes_extra_permissions_once() {
        let store = InMemoryAdminService::new().with_permissions(["reports", "admin", "reports"]);
        let catalog = store.list_permissions(&admin()).await.expect("list");
        let ids: Vec<_> = catalog.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["admin", "public", "reports"]);
        assert_eq!(catalog[2].category, "custom");
    }

    #[tokio::test]
    async fn padded_ids_match_trimmed_records() {
        let store = InMemoryAdminService::new();
        let session = admin();
        let user = store.create_user(&session, " bob ").await.expect("create");
        assert_eq!(user.user_id, "bob");
        store.create_role(&session, "ops\t").await.expect("create");

        let listed = store.list_users(&session, Some(" bob")).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(store.list_roles(&session, Some(" ops ")).await.expect("list").len(), 1);

        assert!(store.grant_user_role(&session, " bob ", " ops").await.expect("grant"));
        assert!(
            store
                .set_role_permissions(&session, "ops ", &perms(&[PERMISSION_PUBLIC]))
                .await
                .expect("set")
        );
        assert!(store.revoke_user_role(&session, "bob ", "ops").await.expect("revoke"));
        assert!(store.delete_role(&session, " ops ").await.expect("delete role"));
        assert!(store.delete_user(&session, " bob ").await.expect("delete user"));
        assert!(store.list_users(&session, None).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn blank_id_is_rejected_everywhere() {
        let store = InMemoryAdminService::new();
        let session = admin();
        let err = store.delete_user(&session, "  ").await.expect_err("blank");
        assert!(matches!(err, AdminError::InvalidName { .. }));
        let err = store
            .grant_user_role(&session, "bob", "")
            .await
            .expect_err("blank");
        assert!(matches!(err, AdminError::InvalidName { .. }));
    }
}
