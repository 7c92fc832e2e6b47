use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of resource a lookup or decision refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Post,
    Comment,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Post => "post",
            ResourceKind::Comment => "comment",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership facts for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostOwnership {
    pub author_id: i64,
}

impl PostOwnership {
    pub fn new(author_id: i64) -> Self {
        Self { author_id }
    }
}

/// Ownership facts for a comment: its own author and the author of the
/// post it belongs to. Either one may authorize a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentOwnership {
    pub comment_author_id: i64,
    pub post_author_id: i64,
}

impl CommentOwnership {
    pub fn new(comment_author_id: i64, post_author_id: i64) -> Self {
        Self {
            comment_author_id,
            post_author_id,
        }
    }
}
