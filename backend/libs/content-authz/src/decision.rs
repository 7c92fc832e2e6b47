use crate::error::AccessError;
use serde::Serialize;

/// Outcome of a policy check. Never partial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn from_bool(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
        }
    }

    /// Turn a DENY into `AccessError::Unauthorized`.
    pub fn ensure_allowed(self) -> Result<(), AccessError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(AccessError::Unauthorized),
        }
    }
}
