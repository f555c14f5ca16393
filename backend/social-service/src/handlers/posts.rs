/// Post and feed handlers
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{FeedCursor, PageRequest};
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::{CreatePost, UpdatePost};
use crate::state::AppState;

/// Response header carrying the cursor for the next feed page
pub const NEXT_CURSOR_HEADER: &str = "x-next-cursor";

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

impl FeedQuery {
    /// `None` asks for the whole feed
    fn page(&self, max_page_size: usize) -> Result<Option<PageRequest>> {
        let after = self.cursor.as_deref().map(FeedCursor::decode).transpose()?;
        if self.limit.is_none() && after.is_none() {
            return Ok(None);
        }

        let limit = self
            .limit
            .unwrap_or(max_page_size)
            .clamp(1, max_page_size);
        Ok(Some(PageRequest { limit, after }))
    }
}

/// GET /api/v1/posts
pub async fn list_feed(
    state: web::Data<AppState>,
    user_id: UserId,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let page = query.page(state.feed_config.max_page_size)?;
    let feed = state.feed.get_feed(user_id.0, page).await?;

    let mut response = HttpResponse::Ok();
    if let Some(cursor) = feed.next_cursor {
        response.insert_header((NEXT_CURSOR_HEADER, cursor.encode()));
    }
    Ok(response.json(feed.items))
}

/// POST /api/v1/posts
pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    body: web::Json<CreatePost>,
) -> Result<HttpResponse> {
    let item = state.posts.create(user_id.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(item))
}

/// GET /api/v1/posts/{post_id}
pub async fn get_post(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let item = state.posts.get(user_id.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// PUT /api/v1/posts/{post_id}
pub async fn update_post(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePost>,
) -> Result<HttpResponse> {
    let item = state
        .posts
        .update(user_id.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(item))
}

/// DELETE /api/v1/posts/{post_id}
pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.posts.delete(user_id.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(limit: Option<usize>, cursor: Option<&str>) -> FeedQuery {
        FeedQuery {
            limit,
            cursor: cursor.map(str::to_string),
        }
    }

    #[test]
    fn test_no_params_means_full_feed() {
        assert_eq!(query(None, None).page(100).unwrap(), None);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(query(Some(0), None).page(100).unwrap().unwrap().limit, 1);
        assert_eq!(query(Some(500), None).page(100).unwrap().unwrap().limit, 100);
        assert_eq!(query(Some(7), None).page(100).unwrap().unwrap().limit, 7);
    }

    #[test]
    fn test_bad_cursor_is_rejected() {
        assert!(query(Some(10), Some("%%%")).page(100).is_err());
    }
}
