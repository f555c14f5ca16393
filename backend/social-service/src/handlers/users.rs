/// Profile and follow-graph handlers
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
}

/// GET /api/v1/users/profile
pub async fn own_profile(state: web::Data<AppState>, user_id: UserId) -> Result<HttpResponse> {
    let profile = state.profiles.get(user_id.0).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/v1/users/{username}/profile
pub async fn profile_by_username(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let profile = state.profiles.by_username(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/v1/users/profiles?search=
pub async fn search_profiles(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let profiles = state.profiles.search(&query.search).await?;
    Ok(HttpResponse::Ok().json(profiles))
}

/// POST /api/v1/users/{user_id}/follow
pub async fn follow(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let edge = state.follows.follow(user_id.0, path.into_inner()).await?;
    Ok(HttpResponse::Created().json(edge))
}

/// DELETE /api/v1/users/{user_id}/unfollow
pub async fn unfollow(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.follows.unfollow(user_id.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/v1/users/{user_id}/followers
pub async fn followers(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let edges = state.follows.followers_of(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(edges))
}

/// GET /api/v1/users/{user_id}/following
pub async fn following(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let edges = state.follows.following_of(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(edges))
}
