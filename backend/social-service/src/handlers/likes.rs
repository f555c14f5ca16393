use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::state::AppState;

/// POST /api/v1/posts/{post_id}/like
pub async fn like_post(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let like = state.engagement.like(user_id.0, path.into_inner()).await?;
    Ok(HttpResponse::Created().json(like))
}

/// DELETE /api/v1/posts/{post_id}/like
pub async fn unlike_post(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.engagement.unlike(user_id.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
