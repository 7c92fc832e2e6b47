use crate::error::Result;
use crate::models::{Post, PostChanges};
use async_trait::async_trait;
use content_authz::AccessError;
use sqlx::PgPool;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post authored by `author_id`
    async fn create_post(&self, author_id: i64, title: &str, text: &str) -> Result<Post>;

    /// All posts written by `author_id`, newest first
    async fn find_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>>;

    /// Resolve a post scoped to its owner
    async fn find_post_of_user(&self, owner_id: i64, post_id: i64) -> Result<Option<Post>>;

    /// Apply changes and return the stored post
    async fn update_post(&self, post_id: i64, changes: &PostChanges) -> Result<Post>;

    /// Delete a post; comments go with it through the foreign key cascade
    async fn delete_post(&self, post_id: i64) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create_post(&self, author_id: i64, title: &str, text: &str) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (author_id, title, text)
            VALUES ($1, $2, $3)
            RETURNING id, author_id, title, text, created_at, updated_at
            "#,
        )
        .bind(author_id)
        .bind(title)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_posts_by_author(&self, author_id: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, text, created_at, updated_at
            FROM posts
            WHERE author_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn find_post_of_user(&self, owner_id: i64, post_id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, text, created_at, updated_at
            FROM posts
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(post_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn update_post(&self, post_id: i64, changes: &PostChanges) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                text = COALESCE($3, text),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, author_id, title, text, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(changes.title.as_deref())
        .bind(changes.text.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        // Deleted after it was resolved.
        post.ok_or_else(|| AccessError::post_not_found(post_id).into())
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
