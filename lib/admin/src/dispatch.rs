//! Request dispatch with declarative permission checks.

use cloudgate_platform_access::Session;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::AdminError;
use crate::model::{AdminPermissionInfo, AdminRoleInfo, AdminUserInfo};
use crate::permission::AdminOperation;
use crate::service::AdminService;

/// A call to one admin operation, as received over the wire.
///
/// ```json
/// { "operation": "grantUserRole", "params": { "userId": "alice", "roleId": "dba" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "operation",
    content = "params",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum AdminRequest {
    ListUsers {
        #[serde(default)]
        user_id: Option<String>,
    },
    ListRoles {
        #[serde(default)]
        role_id: Option<String>,
    },
    ListPermissions,
    CreateUser {
        user_id: String,
    },
    DeleteUser {
        user_id: String,
    },
    CreateRole {
        role_id: String,
    },
    DeleteRole {
        role_id: String,
    },
    GrantUserRole {
        user_id: String,
        role_id: String,
    },
    RevokeUserRole {
        user_id: String,
        role_id: String,
    },
    SetRolePermissions {
        role_id: String,
        permissions: BTreeSet<String>,
    },
}

impl AdminRequest {
    /// Returns the operation this request invokes.
    #[must_use]
    pub fn operation(&self) -> AdminOperation {
        match self {
            Self::ListUsers { .. } => AdminOperation::ListUsers,
            Self::ListRoles { .. } => AdminOperation::ListRoles,
            Self::ListPermissions => AdminOperation::ListPermissions,
            Self::CreateUser { .. } => AdminOperation::CreateUser,
            Self::DeleteUser { .. } => AdminOperation::DeleteUser,
            Self::CreateRole { .. } => AdminOperation::CreateRole,
            Self::DeleteRole { .. } => AdminOperation::DeleteRole,
            Self::GrantUserRole { .. } => AdminOperation::GrantUserRole,
            Self::RevokeUserRole { .. } => AdminOperation::RevokeUserRole,
            Self::SetRolePermissions { .. } => AdminOperation::SetRolePermissions,
        }
    }
}

/// Result of a dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AdminResponse {
    Users(Vec<AdminUserInfo>),
    Roles(Vec<AdminRoleInfo>),
    Permissions(Vec<AdminPermissionInfo>),
    User(AdminUserInfo),
    Role(AdminRoleInfo),
    Done(bool),
}

/// Permission requirement of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationInfo {
    pub operation: AdminOperation,
    pub required_permissions: &'static [&'static str],
}

/// Checks the caller's permissions and forwards requests to an
/// [`AdminService`].
#[derive(Clone)]
pub struct AdminDispatcher {
    service: Arc<dyn AdminService>,
}

impl std::fmt::Debug for AdminDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminDispatcher").finish_non_exhaustive()
    }
}

impl AdminDispatcher {
    /// Creates a dispatcher for the given service.
    #[must_use]
    pub fn new(service: Arc<dyn AdminService>) -> Self {
        Self { service }
    }

    /// Returns the permission table of all operations.
    #[must_use]
    pub fn operations() -> Vec<OperationInfo> {
        AdminOperation::ALL
            .into_iter()
            .map(|operation| OperationInfo {
                operation,
                required_permissions: operation.required_permissions(),
            })
            .collect()
    }

    /// Authorizes `session` for the request's operation, then runs it.
    #[instrument(skip_all, fields(operation = %request.operation()))]
    pub async fn dispatch(
        &self,
        session: Option<&Session>,
        request: AdminRequest,
    ) -> Result<AdminResponse, AdminError> {
        let session = authorize(session, request.operation())?;
        let service = self.service.as_ref();

        let response = match request {
            AdminRequest::ListUsers { user_id } => {
                AdminResponse::Users(service.list_users(session, user_id.as_deref()).await?)
            }
            AdminRequest::ListRoles { role_id } => {
                AdminResponse::Roles(service.list_roles(session, role_id.as_deref()).await?)
            }
            AdminRequest::ListPermissions => {
                AdminResponse::Permissions(service.list_permissions(session).await?)
            }
            AdminRequest::CreateUser { user_id } => {
                AdminResponse::User(service.create_user(session, &user_id).await?)
            }
            AdminRequest::DeleteUser { user_id } => {
                AdminResponse::Done(service.delete_user(session, &user_id).await?)
            }
            AdminRequest::CreateRole { role_id } => {
                AdminResponse::Role(service.create_role(session, &role_id).await?)
            }
            AdminRequest::DeleteRole { role_id } => {
                AdminResponse::Done(service.delete_role(session, &role_id).await?)
            }
            AdminRequest::GrantUserRole { user_id, role_id } => AdminResponse::Done(
                service
                    .grant_user_role(session, &user_id, &role_id)
                    .await?,
            ),
            AdminRequest::RevokeUserRole { user_id, role_id } => AdminResponse::Done(
                service
                    .revoke_user_role(session, &user_id, &role_id)
                    .await?,
            ),
            AdminRequest::SetRolePermissions {
                role_id,
                permissions,
            } => AdminResponse::Done(
                service
                    .set_role_permissions(session, &role_id, &permissions)
                    .await?,
            ),
        };
        Ok(response)
    }
}

fn authorize(session: Option<&Session>, operation: AdminOperation) -> Result<&Session, AdminError> {
    let session = session
        .filter(|s| s.is_authenticated())
        .ok_or(AdminError::InvalidSession)?;

    if let Some(missing) = operation
        .required_permissions()
        .iter()
        .find(|permission| !session.has_permission(permission))
    {
        debug!(
            user_id = ?session.user_id(),
            permission = missing,
            "admin operation denied"
        );
        return Err(AdminError::PermissionDenied {
            operation: operation.name().to_string(),
            permission: (*missing).to_string(),
        });
    }
    Ok(session)
}
