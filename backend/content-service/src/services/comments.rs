/// Comment service - resolves the post/comment chain before every decision
use crate::db::CommentRepository;
use crate::error::Result;
use crate::metrics::authz::record_not_found;
use crate::models::{Comment, MessageResponse, COMMENT_DELETED_MESSAGE};
use crate::services::posts::{enforce, PostService};
use content_authz::{AccessError, AccessPolicy, Identity, ResourceKind};
use std::sync::Arc;

pub struct CommentService {
    posts: Arc<PostService>,
    repo: Arc<dyn CommentRepository>,
    policy: Arc<dyn AccessPolicy>,
}

impl CommentService {
    pub fn new(
        posts: Arc<PostService>,
        repo: Arc<dyn CommentRepository>,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            posts,
            repo,
            policy,
        }
    }

    /// Comments of a post; the post only has to resolve under `user_id`
    pub async fn list_comments(&self, user_id: i64, post_id: i64) -> Result<Vec<Comment>> {
        let post = self.posts.resolve_post(user_id, post_id).await?;
        self.repo.find_comments_by_post(post.id).await
    }

    pub async fn get_comment(&self, user_id: i64, post_id: i64, comment_id: i64) -> Result<Comment> {
        let post = self.posts.resolve_post(user_id, post_id).await?;

        match self.repo.find_comment(post.id, comment_id).await? {
            Some(comment) => Ok(comment),
            None => {
                record_not_found(ResourceKind::Comment);
                Err(AccessError::comment_not_found(comment_id).into())
            }
        }
    }

    /// Comment on a post resolved under the path's owner id
    pub async fn create_comment(
        &self,
        identity: &Identity,
        user_id: i64,
        post_id: i64,
        text: &str,
    ) -> Result<Comment> {
        let post = self.posts.resolve_post_for_write(user_id, post_id).await?;
        let decision = self.policy.can_create_comment(identity, &post.ownership());
        enforce("create_comment", identity, post_id, decision)?;

        let comment = self.repo.create_comment(post.id, identity.id(), text).await?;
        tracing::info!(comment_id = comment.id, post_id, user_id = identity.id(), "comment created");
        Ok(comment)
    }

    /// Delete a comment as its author, the post's author, or an admin
    pub async fn delete_comment(
        &self,
        identity: &Identity,
        post_id: i64,
        comment_id: i64,
    ) -> Result<MessageResponse> {
        let ownership = match self.repo.find_comment_ownership(post_id, comment_id).await? {
            Some(ownership) => ownership,
            None => {
                tracing::warn!(
                    user_id = identity.id(),
                    post_id,
                    comment_id,
                    "trying to delete comment which does not exist"
                );
                record_not_found(ResourceKind::Comment);
                return Err(AccessError::comment_not_found(comment_id).into());
            }
        };

        let decision = self.policy.can_delete_comment(identity, &ownership);
        enforce("delete_comment", identity, comment_id, decision)?;

        if !self.repo.delete_comment(comment_id).await? {
            return Err(AccessError::comment_not_found(comment_id).into());
        }

        tracing::info!(comment_id, post_id, actor_id = identity.id(), "comment deleted");
        Ok(MessageResponse::new(COMMENT_DELETED_MESSAGE))
    }
}
