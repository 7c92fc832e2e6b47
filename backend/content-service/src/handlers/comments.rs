/// Comment handlers - HTTP endpoints nested under a user's post
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::CreateCommentRequest;
use crate::services::CommentService;
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Get comments for a post
pub async fn get_post_comments(
    service: web::Data<CommentService>,
    _user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let (user_id, post_id) = path.into_inner();
    let comments = service.list_comments(user_id, post_id).await?;

    Ok(HttpResponse::Ok().json(comments))
}

/// Get a single comment
pub async fn get_comment(
    service: web::Data<CommentService>,
    _user: AuthenticatedUser,
    path: web::Path<(i64, i64, i64)>,
) -> Result<HttpResponse> {
    let (user_id, post_id, comment_id) = path.into_inner();
    let comment = service.get_comment(user_id, post_id, comment_id).await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// Create a new comment
pub async fn create_comment(
    service: web::Data<CommentService>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let (user_id, post_id) = path.into_inner();
    let comment = service
        .create_comment(&user.0, user_id, post_id, &req.text)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// Delete a comment
pub async fn delete_comment(
    service: web::Data<CommentService>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64, i64)>,
) -> Result<HttpResponse> {
    let (user_id, post_id, comment_id) = path.into_inner();
    tracing::debug!(user_id, post_id, comment_id, "delete comment requested");
    let response = service.delete_comment(&user.0, post_id, comment_id).await?;

    Ok(HttpResponse::Ok().json(response))
}
