/// Policy evaluation for posts and comments
///
/// Every method is pure: the decision depends only on the identity and the
/// descriptor passed in. Callers must resolve the descriptor first and must
/// not call into the policy when the resource could not be found.
use crate::decision::Decision;
use crate::identity::Identity;
use crate::ownership::{CommentOwnership, PostOwnership};

pub trait AccessPolicy: Send + Sync {
    /// Reads are scoped to the owner. Admins get no override.
    fn can_read_post(&self, identity: &Identity, post: &PostOwnership) -> Decision;

    /// Only the author may update a post. Admins get no override.
    fn can_update_post(&self, identity: &Identity, post: &PostOwnership) -> Decision;

    /// Only the author may delete a post. Admins get no override.
    fn can_delete_post(&self, identity: &Identity, post: &PostOwnership) -> Decision;

    /// Any identity may comment once the post has been resolved under the
    /// owner id the caller was given.
    fn can_create_comment(&self, identity: &Identity, post: &PostOwnership) -> Decision;

    /// Admin, the post's author or the comment's author may delete a comment.
    fn can_delete_comment(&self, identity: &Identity, comment: &CommentOwnership) -> Decision;
}

/// Default ownership rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipPolicy;

impl OwnershipPolicy {
    pub fn new() -> Self {
        Self
    }

    fn is_author(identity: &Identity, post: &PostOwnership) -> Decision {
        Decision::from_bool(post.author_id == identity.id())
    }
}

impl AccessPolicy for OwnershipPolicy {
    fn can_read_post(&self, identity: &Identity, post: &PostOwnership) -> Decision {
        Self::is_author(identity, post)
    }

    fn can_update_post(&self, identity: &Identity, post: &PostOwnership) -> Decision {
        Self::is_author(identity, post)
    }

    fn can_delete_post(&self, identity: &Identity, post: &PostOwnership) -> Decision {
        Self::is_author(identity, post)
    }

    fn can_create_comment(&self, _identity: &Identity, _post: &PostOwnership) -> Decision {
        Decision::Allow
    }

    fn can_delete_comment(&self, identity: &Identity, comment: &CommentOwnership) -> Decision {
        let is_admin = identity.is_admin();
        let owns_post = comment.post_author_id == identity.id();
        let owns_comment = comment.comment_author_id == identity.id();

        Decision::from_bool(is_admin || owns_post || owns_comment)
    }
}
