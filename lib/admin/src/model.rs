//! Views returned by admin operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user as seen by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserInfo {
    /// The user name.
    pub user_id: String,
    /// Roles granted to the user, sorted.
    pub granted_roles: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// A role as seen by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRoleInfo {
    pub role_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Permission ids held by the role, sorted.
    pub permissions: Vec<String>,
    /// Users the role is granted to, sorted.
    pub granted_users: Vec<String>,
}

/// An entry of the permission catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPermissionInfo {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
}

impl AdminPermissionInfo {
    /// Creates a catalog entry.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            category: category.into(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_info_serializes_camel_case() {
        let user = AdminUserInfo {
            user_id: "alice".to_string(),
            granted_roles: vec!["dba".to_string()],
            enabled: true,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).expect("serialize");
        assert_eq!(json["userId"], "alice");
        assert_eq!(json["grantedRoles"][0], "dba");
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn role_info_omits_missing_name() {
        let role = AdminRoleInfo {
            role_id: "dba".to_string(),
            name: None,
            description: None,
            permissions: Vec::new(),
            granted_users: Vec::new(),
        };
        let json = serde_json::to_value(&role).expect("serialize");
        assert!(json.get("name").is_none());
        assert_eq!(json["grantedUsers"], serde_json::json!([]));
    }

    #[test]
    fn permission_builder() {
        let permission = AdminPermissionInfo::new("admin", "Administration", "platform")
            .with_description("Manage users and roles");
        assert_eq!(permission.id, "admin");
        assert_eq!(permission.description.as_deref(), Some("Manage users and roles"));
    }
}
