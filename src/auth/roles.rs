//! Role-based access control (RBAC) module.
//!
//! Each account role maps to a set of `resource:action` permissions.
//! Ownership of individual listings is checked separately by the services.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::database::schema::types::UserRole;

/// Permission represents a specific action on a resource.
/// Format: "resource:action" (e.g., "rfqs:create", "quotes:submit")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission(String);

impl Permission {
    pub fn new(resource: &str, action: &str) -> Self {
        Self(format!("{}:{}", resource, action))
    }

    pub fn wildcard(resource: &str) -> Self {
        Self(format!("{}:*", resource))
    }

    pub fn resource(&self) -> &str {
        self.0.split(':').next().unwrap_or("")
    }

    pub fn action(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or("")
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.ends_with(":*")
    }

    /// Check if this permission grants access to the requested permission
    pub fn grants(&self, requested: &Permission) -> bool {
        if self.0 == requested.0 {
            return true;
        }

        self.is_wildcard() && self.resource() == requested.resource()
    }
}

impl From<&str> for Permission {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UserRole {
    /// Permissions the services check for this role. Anything not listed
    /// here is open to every signed-in user or guarded by ownership.
    pub fn permissions(&self) -> HashSet<Permission> {
        let granted: &[&str] = match self {
            UserRole::Buyer => &["rfqs:create", "rfqs:manage"],
            UserRole::Supplier => &[
                "products:*",
                "quotes:submit",
                "quotes:read",
                "suppliers:profile",
            ],
            UserRole::Admin => &["suppliers:verify"],
        };
        granted.iter().copied().map(Permission::from).collect()
    }

    /// Check if role has a specific permission
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions().iter().any(|p| p.grants(permission))
    }
}
