use std::sync::Arc;

use sqlx::PgPool;

use crate::config::FeedConfig;
use crate::error::Result;
use crate::repository::{
    CommentRepository, FollowRepository, IdentityDirectory, LikeRepository, MemoryStore,
    PostRepository, PostgresCommentRepository, PostgresFollowRepository,
    PostgresIdentityDirectory, PostgresLikeRepository, PostgresPostRepository,
};
use crate::services::{EngagementService, FeedService, FollowService, PostService, ProfileService};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedService,
    pub posts: PostService,
    pub engagement: EngagementService,
    pub follows: FollowService,
    pub profiles: ProfileService,
    pub feed_config: FeedConfig,
    post_store: Arc<dyn PostRepository>,
}

impl AppState {
    pub fn from_stores(
        identities: Arc<dyn IdentityDirectory>,
        follows: Arc<dyn FollowRepository>,
        posts: Arc<dyn PostRepository>,
        likes: Arc<dyn LikeRepository>,
        comments: Arc<dyn CommentRepository>,
        feed_config: FeedConfig,
    ) -> Self {
        let feed = FeedService::new(
            follows.clone(),
            posts.clone(),
            likes.clone(),
            comments.clone(),
            identities.clone(),
        );

        Self {
            posts: PostService::new(posts.clone(), identities.clone(), feed.clone()),
            engagement: EngagementService::new(
                posts.clone(),
                likes,
                comments,
                identities.clone(),
            ),
            follows: FollowService::new(follows, identities.clone()),
            profiles: ProfileService::new(identities),
            feed,
            feed_config,
            post_store: posts,
        }
    }

    pub fn postgres(pool: PgPool, feed_config: FeedConfig) -> Self {
        Self::from_stores(
            Arc::new(PostgresIdentityDirectory::new(pool.clone())),
            Arc::new(PostgresFollowRepository::new(pool.clone())),
            Arc::new(PostgresPostRepository::new(pool.clone())),
            Arc::new(PostgresLikeRepository::new(pool.clone())),
            Arc::new(PostgresCommentRepository::new(pool)),
            feed_config,
        )
    }

    pub fn in_memory(store: Arc<MemoryStore>, feed_config: FeedConfig) -> Self {
        Self::from_stores(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            feed_config,
        )
    }

    /// Store round-trip used by the readiness probe
    pub async fn ready(&self) -> Result<()> {
        self.post_store.health_check().await
    }
}
