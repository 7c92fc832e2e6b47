/// HTTP handlers for content-related endpoints
///
/// - Posts: create, list, read, update, delete
/// - Comments: list, read, create, delete, nested under
///   `/users/{user_id}/posts/{post_id}`
pub mod comments;
pub mod posts;

use actix_web::web;

// Re-export handler functions at module level
pub use comments::{create_comment, delete_comment, get_comment, get_post_comments};
pub use posts::{create_post, delete_post, get_post, get_user_posts, update_post};

/// Register post and comment routes. Mount under an authenticated scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/posts", web::post().to(create_post))
        .route("/users/{user_id}/posts", web::get().to(get_user_posts))
        .service(
            web::resource("/users/{user_id}/posts/{post_id}")
                .route(web::get().to(get_post))
                .route(web::patch().to(update_post))
                .route(web::delete().to(delete_post)),
        )
        .service(
            web::resource("/users/{user_id}/posts/{post_id}/comments")
                .route(web::get().to(get_post_comments))
                .route(web::post().to(create_comment)),
        )
        .service(
            web::resource("/users/{user_id}/posts/{post_id}/comments/{comment_id}")
                .route(web::get().to(get_comment))
                .route(web::delete().to(delete_comment)),
        );
}
