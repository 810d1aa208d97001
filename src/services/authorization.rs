use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::OwnerId;
use crate::errors::{RegistryError, RegistryResult};

/// Role with permission hierarchy. Admins see and manage everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Check if this role has the permissions of another role
    pub fn has_permission(&self, required: Role) -> bool {
        matches!((self, required), (Role::Admin, _) | (Role::User, Role::User))
    }
}

/// The caller on whose behalf a registry query runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: OwnerId,
    pub role: Role,
}

impl Principal {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: OwnerId::new(id),
            role: Role::User,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: OwnerId::new(id),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether records owned by `owner` are visible to this principal
    pub fn can_view_owner(&self, owner: &OwnerId) -> bool {
        self.is_admin() || &self.id == owner
    }

    /// Fail with `Forbidden` unless the principal holds the admin role
    pub fn require_admin(&self, action: &str) -> RegistryResult<()> {
        if self.role.has_permission(Role::Admin) {
            Ok(())
        } else {
            Err(RegistryError::forbidden(format!(
                "Access denied: {} requires {} role",
                action,
                Role::Admin.as_str()
            )))
        }
    }
}
