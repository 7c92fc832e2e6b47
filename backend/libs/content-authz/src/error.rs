use crate::ownership::ResourceKind;
use thiserror::Error;

/// Failure raised by a caller when turning a lookup or a decision into an
/// outcome.
///
/// `NotFound` means the ownership chain could not be resolved. `Unauthorized`
/// means the resource exists and the policy denied access. Callers choose how
/// much of that distinction to disclose, but the two are tracked separately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("No such {kind} exists with id : {id}")]
    NotFound { kind: ResourceKind, id: i64 },

    #[error("Unauthorized")]
    Unauthorized,
}

impl AccessError {
    pub fn not_found(kind: ResourceKind, id: i64) -> Self {
        AccessError::NotFound { kind, id }
    }

    pub fn post_not_found(post_id: i64) -> Self {
        Self::not_found(ResourceKind::Post, post_id)
    }

    pub fn comment_not_found(comment_id: i64) -> Self {
        Self::not_found(ResourceKind::Comment, comment_id)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AccessError::NotFound { .. })
    }
}
