use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::Result;
use crate::metrics::content::POST_CACHE_EVENTS;
use crate::models::Post;

pub fn post_key(post_id: i64) -> String {
    format!("post:v1:{}", post_id)
}

/// Post cache keyed by post id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostCache: Send + Sync {
    async fn get_post(&self, post_id: i64) -> Result<Option<Post>>;

    async fn cache_post(&self, post: &Post) -> Result<()>;

    async fn invalidate_post(&self, post_id: i64) -> Result<()>;
}

/// Decode a cached entry, `None` when it no longer matches `Post`
fn decode_post(post_id: i64, data: &str) -> Option<Post> {
    match serde_json::from_str::<Post>(data) {
        Ok(post) => Some(post),
        Err(e) => {
            warn!(post_id, "discarding undecodable cached post: {}", e);
            None
        }
    }
}

#[derive(Clone)]
pub struct RedisPostCache {
    redis: ConnectionManager,
    ttl: Duration,
}

impl RedisPostCache {
    pub fn new(redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self {
            redis,
            ttl: Duration::from_secs(ttl_secs),
        }
    }
}

#[async_trait]
impl PostCache for RedisPostCache {
    async fn get_post(&self, post_id: i64) -> Result<Option<Post>> {
        let key = post_key(post_id);
        let mut conn = self.redis.clone();

        let cached: Option<String> = conn.get(&key).await?;

        let Some(data) = cached else {
            debug!(post_id, "post cache MISS");
            POST_CACHE_EVENTS.with_label_values(&["miss"]).inc();
            return Ok(None);
        };

        match decode_post(post_id, &data) {
            Some(post) => {
                debug!(post_id, "post cache HIT");
                POST_CACHE_EVENTS.with_label_values(&["hit"]).inc();
                Ok(Some(post))
            }
            None => {
                POST_CACHE_EVENTS.with_label_values(&["error"]).inc();
                conn.del::<_, ()>(&key).await?;
                Ok(None)
            }
        }
    }

    async fn cache_post(&self, post: &Post) -> Result<()> {
        let key = post_key(post.id);
        let data = serde_json::to_string(post)?;
        let mut conn = self.redis.clone();

        conn.set_ex::<_, _, ()>(&key, data, self.ttl.as_secs())
            .await?;

        Ok(())
    }

    async fn invalidate_post(&self, post_id: i64) -> Result<()> {
        let mut conn = self.redis.clone();
        conn.del::<_, ()>(post_key(post_id)).await?;
        Ok(())
    }
}
