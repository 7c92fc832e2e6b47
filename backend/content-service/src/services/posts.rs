/// Post service - resolves posts, asks the policy, then mutates
use crate::cache::PostCache;
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::metrics::authz::{record_decision, record_not_found};
use crate::models::{MessageResponse, Post, PostChanges, POST_DELETED_MESSAGE};
use content_authz::{AccessError, AccessPolicy, Decision, Identity, ResourceKind};
use std::sync::Arc;

pub struct PostService {
    repo: Arc<dyn PostRepository>,
    policy: Arc<dyn AccessPolicy>,
    cache: Option<Arc<dyn PostCache>>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>, policy: Arc<dyn AccessPolicy>) -> Self {
        Self {
            repo,
            policy,
            cache: None,
        }
    }

    pub fn with_cache(
        repo: Arc<dyn PostRepository>,
        policy: Arc<dyn AccessPolicy>,
        cache: Arc<dyn PostCache>,
    ) -> Self {
        Self {
            repo,
            policy,
            cache: Some(cache),
        }
    }

    /// Create a post authored by the acting identity
    pub async fn create_post(&self, identity: &Identity, title: &str, text: &str) -> Result<Post> {
        let post = self.repo.create_post(identity.id(), title, text).await?;
        tracing::info!(post_id = post.id, author_id = post.author_id, "post created");
        Ok(post)
    }

    /// Posts of `user_id` that the identity may read
    pub async fn list_posts_of_user(&self, identity: &Identity, user_id: i64) -> Result<Vec<Post>> {
        let posts = self.repo.find_posts_by_author(user_id).await?;

        let readable: Vec<Post> = posts
            .into_iter()
            .filter(|post| {
                let decision = self.policy.can_read_post(identity, &post.ownership());
                record_decision("read_post", decision);
                decision.is_allowed()
            })
            .collect();

        tracing::debug!(
            actor_id = identity.id(),
            user_id,
            readable = readable.len(),
            "listed posts"
        );
        Ok(readable)
    }

    /// Resolve a post under the owner id taken from the request path.
    ///
    /// A missing post is reported as `NotFound` and the policy is never asked.
    /// Cached posts are accepted here, so only read paths go through this.
    pub async fn resolve_post(&self, user_id: i64, post_id: i64) -> Result<Post> {
        if let Some(cache) = &self.cache {
            match cache.get_post(post_id).await {
                Ok(Some(post)) if post.author_id == user_id => return Ok(post),
                Ok(_) => {}
                Err(err) => tracing::debug!(post_id, "post cache get failed: {}", err),
            }
        }

        let post = self.resolve_post_for_write(user_id, post_id).await?;

        if let Some(cache) = &self.cache {
            if let Err(err) = cache.cache_post(&post).await {
                tracing::debug!(post_id, "post cache set failed: {}", err);
            }
        }

        Ok(post)
    }

    /// Resolve a post from the database, skipping the cache.
    pub(crate) async fn resolve_post_for_write(&self, user_id: i64, post_id: i64) -> Result<Post> {
        match self.repo.find_post_of_user(user_id, post_id).await? {
            Some(post) => Ok(post),
            None => {
                tracing::warn!(user_id, post_id, "trying to access post which does not exist");
                record_not_found(ResourceKind::Post);
                Err(AccessError::post_not_found(post_id).into())
            }
        }
    }

    pub async fn get_post(&self, identity: &Identity, user_id: i64, post_id: i64) -> Result<Post> {
        let post = self.resolve_post(user_id, post_id).await?;
        let decision = self.policy.can_read_post(identity, &post.ownership());
        enforce("read_post", identity, post_id, decision)?;
        Ok(post)
    }

    pub async fn update_post(
        &self,
        identity: &Identity,
        user_id: i64,
        post_id: i64,
        changes: &PostChanges,
    ) -> Result<Post> {
        if changes.is_empty() {
            return Err(AppError::BadRequest(
                "at least one of title or text must be provided".to_string(),
            ));
        }

        let post = self.resolve_post_for_write(user_id, post_id).await?;
        let decision = self.policy.can_update_post(identity, &post.ownership());
        enforce("update_post", identity, post_id, decision)?;

        let updated = self.repo.update_post(post_id, changes).await;
        self.invalidate(post_id).await;

        updated
    }

    pub async fn delete_post(
        &self,
        identity: &Identity,
        user_id: i64,
        post_id: i64,
    ) -> Result<MessageResponse> {
        let post = self.resolve_post_for_write(user_id, post_id).await?;
        let decision = self.policy.can_delete_post(identity, &post.ownership());
        enforce("delete_post", identity, post_id, decision)?;

        let deleted = self.repo.delete_post(post_id).await?;
        self.invalidate(post_id).await;

        if !deleted {
            // Removed between resolution and delete.
            return Err(AccessError::post_not_found(post_id).into());
        }

        tracing::info!(post_id, actor_id = identity.id(), "post deleted");
        Ok(MessageResponse::new(POST_DELETED_MESSAGE))
    }

    async fn invalidate(&self, post_id: i64) {
        if let Some(cache) = &self.cache {
            if let Err(err) = cache.invalidate_post(post_id).await {
                tracing::warn!(post_id, "post cache invalidation failed: {}", err);
            }
        }
    }
}

/// Record a decision and turn DENY into `Unauthorized`
pub(crate) fn enforce(
    operation: &str,
    identity: &Identity,
    resource_id: i64,
    decision: Decision,
) -> Result<()> {
    record_decision(operation, decision);

    if decision.is_allowed() {
        tracing::debug!(operation, actor_id = identity.id(), resource_id, "access allowed");
    } else {
        tracing::info!(
            operation,
            actor_id = identity.id(),
            role = %identity.role(),
            resource_id,
            "access denied"
        );
    }

    decision.ensure_allowed().map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MockPostCache;
    use crate::db::MockPostRepository;
    use crate::metrics::authz::AUTHZ_DECISIONS_TOTAL;
    use crate::services::testing::{post, NeverInvokedPolicy};
    use actix_web::ResponseError;
    use content_authz::OwnershipPolicy;
    use mockall::predicate::eq;

    fn service(repo: MockPostRepository) -> PostService {
        PostService::new(Arc::new(repo), Arc::new(OwnershipPolicy))
    }

    fn cached_service(repo: MockPostRepository, cache: MockPostCache) -> PostService {
        PostService::with_cache(Arc::new(repo), Arc::new(OwnershipPolicy), Arc::new(cache))
    }

    fn title_change() -> PostChanges {
        PostChanges {
            title: Some("Updated Title".into()),
            text: None,
        }
    }

    #[tokio::test]
    async fn test_create_post_uses_identity_as_author() {
        let mut repo = MockPostRepository::new();
        repo.expect_create_post()
            .with(eq(1), eq("Test Title"), eq("Test Text"))
            .times(1)
            .returning(|author_id, _, _| Ok(post(1, author_id)));

        let created = service(repo)
            .create_post(&Identity::user(1).unwrap(), "Test Title", "Test Text")
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.author_id, 1);
    }

    #[tokio::test]
    async fn test_list_posts_of_other_user_is_empty() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_posts_by_author()
            .with(eq(2))
            .returning(|author_id| Ok(vec![post(1, author_id), post(2, author_id)]));

        let service = service(repo);
        let own = service
            .list_posts_of_user(&Identity::user(2).unwrap(), 2)
            .await
            .unwrap();
        let foreign = service
            .list_posts_of_user(&Identity::admin(3).unwrap(), 2)
            .await
            .unwrap();

        assert_eq!(own.len(), 2);
        assert!(foreign.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .with(eq(1), eq(1))
            .returning(|_, _| Ok(None));
        repo.expect_update_post().never();

        let service = PostService::new(Arc::new(repo), Arc::new(NeverInvokedPolicy));
        let changes = PostChanges {
            title: Some("Updated Title".into()),
            text: None,
        };
        let err = service
            .update_post(&Identity::user(1).unwrap(), 1, 1, &changes)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "No such post exists with id : 1");
    }

    #[tokio::test]
    async fn test_update_foreign_post_is_unauthorized() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .returning(|owner_id, post_id| Ok(Some(post(post_id, owner_id))));
        repo.expect_update_post().never();

        let changes = PostChanges {
            title: None,
            text: Some("UpdatedText".into()),
        };
        let err = service(repo)
            .update_post(&Identity::admin(1).unwrap(), 2, 7, &changes)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(err.status_code(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_own_post() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .returning(|owner_id, post_id| Ok(Some(post(post_id, owner_id))));
        repo.expect_update_post()
            .times(1)
            .returning(|post_id, changes| {
                let mut updated = post(post_id, 1);
                if let Some(title) = &changes.title {
                    updated.title = title.clone();
                }
                if let Some(text) = &changes.text {
                    updated.text = text.clone();
                }
                Ok(updated)
            });

        let changes = PostChanges {
            title: Some("Updated Title".into()),
            text: Some("UpdatedText".into()),
        };
        let updated = service(repo)
            .update_post(&Identity::user(1).unwrap(), 1, 1, &changes)
            .await
            .unwrap();

        assert_eq!(updated.title, "Updated Title");
        assert_eq!(updated.text, "UpdatedText");
    }

    #[tokio::test]
    async fn test_update_without_changes_is_rejected() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user().never();

        let err = service(repo)
            .update_post(&Identity::user(1).unwrap(), 1, 1, &PostChanges::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_delete_own_post() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .returning(|owner_id, post_id| Ok(Some(post(post_id, owner_id))));
        repo.expect_delete_post()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(true));

        let response = service(repo)
            .delete_post(&Identity::user(1).unwrap(), 1, 1)
            .await
            .unwrap();

        assert_eq!(response.message, "Post deleted successfully.");
    }

    #[tokio::test]
    async fn test_delete_post_with_insufficient_access() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .returning(|owner_id, post_id| Ok(Some(post(post_id, owner_id))));
        repo.expect_delete_post().never();

        let err = service(repo)
            .delete_post(&Identity::user(2).unwrap(), 1, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_post_never_consults_policy() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user().returning(|_, _| Ok(None));
        repo.expect_delete_post().never();

        let service = PostService::new(Arc::new(repo), Arc::new(NeverInvokedPolicy));
        let err = service
            .delete_post(&Identity::admin(1).unwrap(), 1, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_a_denial() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .returning(|_, _| Err(AppError::DatabaseError("connection reset".into())));

        let service = PostService::new(Arc::new(repo), Arc::new(NeverInvokedPolicy));
        let err = service
            .get_post(&Identity::user(1).unwrap(), 1, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn test_list_posts_records_each_decision() {
        let mut repo = MockPostRepository::new();
        repo.expect_find_posts_by_author()
            .returning(|author_id| Ok(vec![post(1, author_id), post(2, author_id)]));

        let denied = AUTHZ_DECISIONS_TOTAL.with_label_values(&["read_post", Decision::Deny.as_str()]);
        let before = denied.get();

        service(repo)
            .list_posts_of_user(&Identity::user(3).unwrap(), 2)
            .await
            .unwrap();

        assert!(denied.get() - before >= 2);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_database() {
        let mut cache = MockPostCache::new();
        cache
            .expect_get_post()
            .with(eq(1))
            .returning(|post_id| Ok(Some(post(post_id, 1))));
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user().never();

        let found = cached_service(repo, cache)
            .get_post(&Identity::user(1).unwrap(), 1, 1)
            .await
            .unwrap();

        assert_eq!(found.id, 1);
    }

    #[tokio::test]
    async fn test_cache_hit_under_other_owner_reads_database() {
        let mut cache = MockPostCache::new();
        cache
            .expect_get_post()
            .returning(|post_id| Ok(Some(post(post_id, 2))));
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .with(eq(1), eq(1))
            .times(1)
            .returning(|_, _| Ok(None));

        let service = PostService::with_cache(
            Arc::new(repo),
            Arc::new(NeverInvokedPolicy),
            Arc::new(cache),
        );
        let err = service
            .get_post(&Identity::user(1).unwrap(), 1, 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cache_errors_fall_back_to_database() {
        let mut cache = MockPostCache::new();
        cache
            .expect_get_post()
            .returning(|_| Err(AppError::CacheError("connection refused".into())));
        cache
            .expect_cache_post()
            .times(1)
            .returning(|_| Err(AppError::CacheError("connection refused".into())));
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .times(1)
            .returning(|owner_id, post_id| Ok(Some(post(post_id, owner_id))));

        let found = cached_service(repo, cache)
            .get_post(&Identity::user(1).unwrap(), 1, 4)
            .await
            .unwrap();

        assert_eq!(found.id, 4);
    }

    #[tokio::test]
    async fn test_database_read_fills_cache() {
        let mut cache = MockPostCache::new();
        cache.expect_get_post().returning(|_| Ok(None));
        cache
            .expect_cache_post()
            .withf(|post| post.id == 4 && post.author_id == 1)
            .times(1)
            .returning(|_| Ok(()));
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .returning(|owner_id, post_id| Ok(Some(post(post_id, owner_id))));

        let result = cached_service(repo, cache)
            .get_post(&Identity::user(1).unwrap(), 1, 4)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_invalidates_cached_post() {
        let mut cache = MockPostCache::new();
        cache.expect_get_post().never();
        cache
            .expect_invalidate_post()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .returning(|owner_id, post_id| Ok(Some(post(post_id, owner_id))));
        repo.expect_update_post()
            .times(1)
            .returning(|post_id, _| Ok(post(post_id, 1)));

        let result = cached_service(repo, cache)
            .update_post(&Identity::user(1).unwrap(), 1, 1, &title_change())
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_ignores_stale_cached_post() {
        let mut cache = MockPostCache::new();
        cache.expect_get_post().never();
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user().returning(|_, _| Ok(None));
        repo.expect_update_post().never();

        let service = PostService::with_cache(
            Arc::new(repo),
            Arc::new(NeverInvokedPolicy),
            Arc::new(cache),
        );
        let err = service
            .update_post(&Identity::user(1).unwrap(), 1, 7, &title_change())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "No such post exists with id : 7");
    }

    #[tokio::test]
    async fn test_update_of_post_deleted_meanwhile_is_not_found() {
        let mut cache = MockPostCache::new();
        cache
            .expect_invalidate_post()
            .with(eq(7))
            .times(1)
            .returning(|_| Ok(()));
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .returning(|owner_id, post_id| Ok(Some(post(post_id, owner_id))));
        repo.expect_update_post()
            .returning(|post_id, _| Err(AccessError::post_not_found(post_id).into()));

        let err = cached_service(repo, cache)
            .update_post(&Identity::user(1).unwrap(), 1, 7, &title_change())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.status_code(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_invalidates_cached_post() {
        let mut cache = MockPostCache::new();
        cache.expect_get_post().never();
        cache
            .expect_invalidate_post()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .returning(|owner_id, post_id| Ok(Some(post(post_id, owner_id))));
        repo.expect_delete_post().returning(|_| Ok(true));

        let result = cached_service(repo, cache)
            .delete_post(&Identity::user(1).unwrap(), 1, 1)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invalidation_failure_does_not_fail_delete() {
        let mut cache = MockPostCache::new();
        cache
            .expect_invalidate_post()
            .times(1)
            .returning(|_| Err(AppError::CacheError("timeout".into())));
        let mut repo = MockPostRepository::new();
        repo.expect_find_post_of_user()
            .returning(|owner_id, post_id| Ok(Some(post(post_id, owner_id))));
        repo.expect_delete_post().returning(|_| Ok(true));

        let response = cached_service(repo, cache)
            .delete_post(&Identity::user(1).unwrap(), 1, 1)
            .await
            .unwrap();

        assert_eq!(response.message, "Post deleted successfully.");
    }
}
