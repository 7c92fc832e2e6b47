/// Content caching layer
///
/// Redis-backed cache for resolved posts. Callers treat every cache error as a
/// miss and fall back to the database. Mutations never trust a cached post.
pub mod post_cache;

pub use post_cache::{post_key, PostCache, RedisPostCache};

#[cfg(test)]
pub use post_cache::MockPostCache;
