/// Data models for content-service
///
/// - `Post`: a blog post owned by exactly one author
/// - `Comment`: a comment belonging to exactly one post and one author
/// - request/response bodies for the HTTP layer
use chrono::{DateTime, Utc};
use content_authz::PostOwnership;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const POST_DELETED_MESSAGE: &str = "Post deleted successfully.";
pub const COMMENT_DELETED_MESSAGE: &str = "Comment deleted successfully!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn ownership(&self) -> PostOwnership {
        PostOwnership::new(self.author_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a post
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
}

/// Request body for updating a post. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct PostChanges {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: Option<String>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.text.is_none()
    }
}

/// Request body for creating a comment
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
}

/// Success payload for deletions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
