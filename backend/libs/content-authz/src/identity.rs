use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Role attached to an authenticated user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(IdentityError::UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("user id must be positive, got {0}")]
    InvalidId(i64),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// The actor performing a request.
///
/// Built once from an authenticated session and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    id: i64,
    role: Role,
}

impl Identity {
    pub fn new(id: i64, role: Role) -> Result<Self, IdentityError> {
        if id < 1 {
            return Err(IdentityError::InvalidId(id));
        }
        Ok(Self { id, role })
    }

    pub fn user(id: i64) -> Result<Self, IdentityError> {
        Self::new(id, Role::User)
    }

    pub fn admin(id: i64) -> Result<Self, IdentityError> {
        Self::new(id, Role::Admin)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
