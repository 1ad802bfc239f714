//! Declarative permission requirements of admin operations.
//!
//! Service implementations never check permissions themselves. The
//! [`AdminDispatcher`](crate::AdminDispatcher) looks up the requirement of
//! each operation here and enforces it before calling the service.

use serde::Serialize;
use std::fmt;

/// Permission required by every admin operation.
pub const PERMISSION_ADMIN: &str = "admin";

const ADMIN_ONLY: &[&str] = &[PERMISSION_ADMIN];

/// The operations of the admin service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AdminOperation {
    ListUsers,
    ListRoles,
    ListPermissions,
    CreateUser,
    DeleteUser,
    CreateRole,
    DeleteRole,
    GrantUserRole,
    RevokeUserRole,
    SetRolePermissions,
}

impl AdminOperation {
    /// All operations, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::ListUsers,
        Self::ListRoles,
        Self::ListPermissions,
        Self::CreateUser,
        Self::DeleteUser,
        Self::CreateRole,
        Self::DeleteRole,
        Self::GrantUserRole,
        Self::RevokeUserRole,
        Self::SetRolePermissions,
    ];

    /// Returns the wire name of the operation.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ListUsers => "listUsers",
            Self::ListRoles => "listRoles",
            Self::ListPermissions => "listPermissions",
            Self::CreateUser => "createUser",
            Self::DeleteUser => "deleteUser",
            Self::CreateRole => "createRole",
            Self::DeleteRole => "deleteRole",
            Self::GrantUserRole => "grantUserRole",
            Self::RevokeUserRole => "revokeUserRole",
            Self::SetRolePermissions => "setRolePermissions",
        }
    }

    /// Returns the permissions a caller must hold to invoke the operation.
    #[must_use]
    pub fn required_permissions(&self) -> &'static [&'static str] {
        match self {
            Self::ListUsers
            | Self::ListRoles
            | Self::ListPermissions
            | Self::CreateUser
            | Self::DeleteUser
            | Self::CreateRole
            | Self::DeleteRole
            | Self::GrantUserRole
            | Self::RevokeUserRole
            | Self::SetRolePermissions => ADMIN_ONLY,
        }
    }
}

impl fmt::Display for AdminOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_requires_admin() {
        for operation in AdminOperation::ALL {
            assert_eq!(operation.required_permissions(), &[PERMISSION_ADMIN]);
        }
    }

    #[test]
    fn names_match_serde() {
        for operation in AdminOperation::ALL {
            let json = serde_json::to_value(operation).expect("serialize");
            assert_eq!(json, operation.name());
        }
    }

    #[test]
    fn display_uses_wire_name() {
        assert_eq!(AdminOperation::SetRolePermissions.to_string(), "setRolePermissions");
    }
}
