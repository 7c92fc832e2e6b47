/// Business logic layer for content-service
///
/// Each mutating operation runs in three steps: resolve the ownership chain
/// through a repository, ask the `AccessPolicy`, then mutate.
/// - Post service: create, list, read, update, delete posts
/// - Comment service: list, read, create, delete comments on a post
pub mod comments;
pub mod posts;

pub use comments::CommentService;
pub use posts::PostService;

#[cfg(test)]
pub(crate) mod testing {
    use crate::models::{Comment, Post};
    use chrono::Utc;
    use content_authz::{AccessPolicy, CommentOwnership, Decision, Identity, PostOwnership};

    pub fn post(id: i64, author_id: i64) -> Post {
        let now = Utc::now();
        Post {
            id,
            author_id,
            title: "Test Title".to_string(),
            text: "Test Text".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn comment(id: i64, post_id: i64, user_id: i64) -> Comment {
        let now = Utc::now();
        Comment {
            id,
            post_id,
            user_id,
            text: "Test Comment".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Policy that fails the test if a service consults it.
    pub struct NeverInvokedPolicy;

    impl AccessPolicy for NeverInvokedPolicy {
        fn can_read_post(&self, _: &Identity, _: &PostOwnership) -> Decision {
            panic!("policy consulted for an unresolved post")
        }

        fn can_update_post(&self, _: &Identity, _: &PostOwnership) -> Decision {
            panic!("policy consulted for an unresolved post")
        }

        fn can_delete_post(&self, _: &Identity, _: &PostOwnership) -> Decision {
            panic!("policy consulted for an unresolved post")
        }

        fn can_create_comment(&self, _: &Identity, _: &PostOwnership) -> Decision {
            panic!("policy consulted for an unresolved post")
        }

        fn can_delete_comment(&self, _: &Identity, _: &CommentOwnership) -> Decision {
            panic!("policy consulted for an unresolved comment")
        }
    }
}
