use crate::error::{AppError, Result};
use crate::models::Comment;
use async_trait::async_trait;
use content_authz::{AccessError, CommentOwnership};
use sqlx::PgPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a new comment on `post_id` written by `user_id`
    async fn create_comment(&self, post_id: i64, user_id: i64, text: &str) -> Result<Comment>;

    /// All comments on a post, oldest first
    async fn find_comments_by_post(&self, post_id: i64) -> Result<Vec<Comment>>;

    /// A single comment, scoped to its post
    async fn find_comment(&self, post_id: i64, comment_id: i64) -> Result<Option<Comment>>;

    /// Comment author plus the parent post's author
    async fn find_comment_ownership(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<CommentOwnership>>;

    async fn delete_comment(&self, comment_id: i64) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create_comment(&self, post_id: i64, user_id: i64, text: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, user_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, user_id, text, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err.as_database_error() {
            // Parent post deleted after it was resolved.
            Some(db_err) if db_err.is_foreign_key_violation() => {
                AppError::from(AccessError::post_not_found(post_id))
            }
            _ => AppError::from(err),
        })?;

        Ok(comment)
    }

    async fn find_comments_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, text, created_at, updated_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn find_comment(&self, post_id: i64, comment_id: i64) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, text, created_at, updated_at
            FROM comments
            WHERE post_id = $1 AND id = $2
            "#,
        )
        .bind(post_id)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn find_comment_ownership(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<CommentOwnership>> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT c.user_id, p.author_id
            FROM comments c
            JOIN posts p ON p.id = c.post_id
            WHERE c.post_id = $1 AND c.id = $2
            "#,
        )
        .bind(post_id)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(comment_author_id, post_author_id)| {
            CommentOwnership::new(comment_author_id, post_author_id)
        }))
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
