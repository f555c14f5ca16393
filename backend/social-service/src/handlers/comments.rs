/// Comment handlers, always scoped to the parent post
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::services::NewComment;
use crate::state::AppState;

pub async fn list_comments(
    state: web::Data<AppState>,
    _user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comments = state.engagement.list_comments(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn add_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
    body: web::Json<NewComment>,
) -> Result<HttpResponse> {
    let comment = state
        .engagement
        .add_comment(user_id.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

pub async fn get_comment(
    state: web::Data<AppState>,
    _user_id: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = state.engagement.get_comment(post_id, comment_id).await?;
    Ok(HttpResponse::Ok().json(comment))
}

pub async fn delete_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    state
        .engagement
        .delete_comment(post_id, comment_id, user_id.0)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
