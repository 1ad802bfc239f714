//! Error types for the admin crate.
//!
//! Every failure maps to an [`AdminErrorKind`] so callers can tell
//! authorization problems apart from missing or conflicting entities.

use serde::Serialize;
use std::fmt;

/// Broad category of an [`AdminError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminErrorKind {
    /// The caller has no valid signed-in session.
    Unauthenticated,
    /// The caller lacks a required permission.
    Forbidden,
    /// A named entity does not exist.
    NotFound,
    /// A named entity already exists.
    Conflict,
    /// The request itself is malformed.
    InvalidInput,
}

/// Errors from admin operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    /// No session, or the session has no signed-in user.
    InvalidSession,
    /// The caller lacks the permission an operation requires.
    PermissionDenied {
        operation: String,
        permission: String,
    },
    /// The named user does not exist.
    UserNotFound { user_id: String },
    /// The named role does not exist.
    RoleNotFound { role_id: String },
    /// A user with this name already exists.
    UserAlreadyExists { user_id: String },
    /// A role with this name already exists.
    RoleAlreadyExists { role_id: String },
    /// The permission id is not in the catalog.
    UnknownPermission { permission: String },
    /// A user or role name is unusable.
    InvalidName { name: String, reason: String },
}

impl AdminError {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> AdminErrorKind {
        match self {
            Self::InvalidSession => AdminErrorKind::Unauthenticated,
            Self::PermissionDenied { .. } => AdminErrorKind::Forbidden,
            Self::UserNotFound { .. } | Self::RoleNotFound { .. } => AdminErrorKind::NotFound,
            Self::UserAlreadyExists { .. } | Self::RoleAlreadyExists { .. } => {
                AdminErrorKind::Conflict
            }
            Self::UnknownPermission { .. } | Self::InvalidName { .. } => {
                AdminErrorKind::InvalidInput
            }
        }
    }
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSession => write!(f, "no signed-in session"),
            Self::PermissionDenied {
                operation,
                permission,
            } => {
                write!(f, "operation '{operation}' requires permission '{permission}'")
            }
            Self::UserNotFound { user_id } => write!(f, "user '{user_id}' not found"),
            Self::RoleNotFound { role_id } => write!(f, "role '{role_id}' not found"),
            Self::UserAlreadyExists { user_id } => write!(f, "user '{user_id}' already exists"),
            Self::RoleAlreadyExists { role_id } => write!(f, "role '{role_id}' already exists"),
            Self::UnknownPermission { permission } => {
                write!(f, "unknown permission '{permission}'")
            }
            Self::InvalidName { name, reason } => write!(f, "invalid name '{name}': {reason}"),
        }
    }
}

impl std::error::Error for AdminError {}
