/// Post handlers - HTTP endpoints for post operations
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::{CreatePostRequest, PostChanges};
use crate::services::PostService;
use actix_web::{web, HttpResponse};
use validator::Validate;

/// Create a new post
pub async fn create_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let post = service.create_post(&user.0, &req.title, &req.text).await?;

    Ok(HttpResponse::Created().json(post))
}

/// Get posts of a user
pub async fn get_user_posts(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    user_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let posts = service.list_posts_of_user(&user.0, *user_id).await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// Get a post by owner and ID
pub async fn get_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let (user_id, post_id) = path.into_inner();
    let post = service.get_post(&user.0, user_id, post_id).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Update title and/or text of a post
pub async fn update_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
    req: web::Json<PostChanges>,
) -> Result<HttpResponse> {
    req.validate()?;
    let (user_id, post_id) = path.into_inner();
    let post = service.update_post(&user.0, user_id, post_id, &req).await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post
pub async fn delete_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse> {
    let (user_id, post_id) = path.into_inner();
    let response = service.delete_post(&user.0, user_id, post_id).await?;

    Ok(HttpResponse::Ok().json(response))
}
