/// Database access layer
///
/// Repository traits double as the resource locator: `find_post_of_user` and
/// `find_comment_ownership` resolve the ownership chain the authorization
/// policy works on. A missing row is `Ok(None)`, never an error.
pub mod comment_repo;
pub mod post_repo;

pub use comment_repo::{CommentRepository, PgCommentRepository};
pub use post_repo::{PgPostRepository, PostRepository};

use sqlx::migrate::Migrator;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[cfg(test)]
pub use comment_repo::MockCommentRepository;
#[cfg(test)]
pub use post_repo::MockPostRepository;
