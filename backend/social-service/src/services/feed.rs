//! Feed assembly.
//!
//! A viewer sees posts authored by everyone they follow plus their own, newest
//! first, each annotated with like/comment counts and the viewer's like state.
//! Nothing is cached: counts are derived from live rows on every request.

use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::domain::{FeedCursor, FeedItem, PageRequest, Post};
use crate::error::{AppError, Result};
use crate::metrics::{FEED_ITEMS_RETURNED, FEED_REQUEST_DURATION_SECONDS};
use crate::repository::{
    CommentRepository, FollowRepository, IdentityDirectory, LikeRepository, PostRepository,
};
use crate::services::{resolve_summaries, summary_for};

/// One feed response; `next_cursor` is set only when more items exist
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub next_cursor: Option<FeedCursor>,
}

#[derive(Clone)]
pub struct FeedService {
    follows: Arc<dyn FollowRepository>,
    posts: Arc<dyn PostRepository>,
    likes: Arc<dyn LikeRepository>,
    comments: Arc<dyn CommentRepository>,
    identities: Arc<dyn IdentityDirectory>,
}

impl FeedService {
    pub fn new(
        follows: Arc<dyn FollowRepository>,
        posts: Arc<dyn PostRepository>,
        likes: Arc<dyn LikeRepository>,
        comments: Arc<dyn CommentRepository>,
        identities: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            follows,
            posts,
            likes,
            comments,
            identities,
        }
    }

    /// Feed for `viewer`. Without `page` every visible post is returned.
    pub async fn get_feed(&self, viewer: Uuid, page: Option<PageRequest>) -> Result<FeedPage> {
        let start = Instant::now();

        let mut visible = self.follows.followee_ids(viewer).await?;
        visible.insert(viewer);
        let authors: Vec<Uuid> = visible.into_iter().collect();

        // One extra row tells us whether another page exists
        let probe = page.map(|p| PageRequest {
            limit: p.limit + 1,
            after: p.after,
        });
        let mut posts = self.posts.list_by_authors(&authors, probe).await?;

        let next_cursor = match page {
            Some(p) if posts.len() > p.limit => {
                posts.truncate(p.limit);
                posts.last().map(FeedCursor::after_post)
            }
            _ => None,
        };

        let items = self.compose(viewer, posts).await?;

        FEED_REQUEST_DURATION_SECONDS
            .with_label_values(&[if page.is_some() { "true" } else { "false" }])
            .observe(start.elapsed().as_secs_f64());
        FEED_ITEMS_RETURNED.observe(items.len() as f64);

        tracing::debug!(
            viewer_id = %viewer,
            authors = authors.len(),
            items = items.len(),
            has_more = next_cursor.is_some(),
            "feed assembled"
        );

        Ok(FeedPage { items, next_cursor })
    }

    /// Annotate `posts` for `viewer`, preserving their order.
    ///
    /// Counts, like state and authors are each fetched in a single batch.
    pub async fn compose(&self, viewer: Uuid, posts: Vec<Post>) -> Result<Vec<FeedItem>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let like_counts = self.likes.like_counts(&post_ids).await?;
        let comment_counts = self.comments.comment_counts(&post_ids).await?;
        let liked = self.likes.liked_post_ids(viewer, &post_ids).await?;
        let authors =
            resolve_summaries(self.identities.as_ref(), posts.iter().map(|p| p.user_id)).await?;

        Ok(posts
            .into_iter()
            .map(|post| FeedItem {
                id: post.id,
                user: summary_for(&authors, post.user_id),
                like_count: like_counts.get(&post.id).copied().unwrap_or(0),
                comment_count: comment_counts.get(&post.id).copied().unwrap_or(0),
                is_liked: liked.contains(&post.id),
                caption: post.caption,
                image: post.image,
                kind: post.kind,
                created_at: post.created_at,
                updated_at: post.updated_at,
            })
            .collect())
    }

    /// Single-post view for `viewer`
    pub async fn describe(&self, viewer: Uuid, post: Post) -> Result<FeedItem> {
        let mut items = self.compose(viewer, vec![post]).await?;
        items
            .pop()
            .ok_or_else(|| AppError::Internal("empty composition".to_string()))
    }
}
