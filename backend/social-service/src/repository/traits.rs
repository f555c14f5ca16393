use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::domain::{
    Comment, FollowEdge, LikeOutcome, NewPost, PageRequest, Post, PostChanges, Profile,
    UserSummary,
};
use crate::error::Result;

/// Read-only view over identities owned by user management.
#[async_trait::async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn get_summary(&self, user_id: Uuid) -> Result<Option<UserSummary>>;

    /// Batched lookup; ids without an identity are absent from the map
    async fn get_summaries(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;

    async fn find_profile_by_username(&self, username: &str) -> Result<Option<Profile>>;

    /// Case-insensitive substring match on username, first name or last name
    async fn search_profiles(&self, query: &str, limit: i64) -> Result<Vec<Profile>>;
}

/// Directed follow edges, unique per (follower, followee).
#[async_trait::async_trait]
pub trait FollowRepository: Send + Sync {
    /// Returns `None` when the edge already exists
    async fn insert_follow(&self, follower_id: Uuid, followee_id: Uuid)
        -> Result<Option<FollowEdge>>;

    /// Returns true if an edge was removed
    async fn delete_follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool>;

    /// Everyone `user_id` follows
    async fn followee_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;

    /// Edges pointing at `user_id`, insertion order
    async fn list_followers(&self, user_id: Uuid) -> Result<Vec<FollowEdge>>;

    /// Edges leaving `user_id`, insertion order
    async fn list_following(&self, user_id: Uuid) -> Result<Vec<FollowEdge>>;
}

#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert_post(&self, post: NewPost) -> Result<Post>;

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Applies `changes` and refreshes `updated_at`; `None` if the post is absent
    async fn update_post(&self, post_id: Uuid, changes: PostChanges) -> Result<Option<Post>>;

    /// Removes the post together with its likes and comments, atomically
    async fn delete_post(&self, post_id: Uuid) -> Result<bool>;

    /// Posts whose author is in `author_ids`, newest first (`created_at DESC, id DESC`).
    /// `page: None` returns every matching post.
    async fn list_by_authors(
        &self,
        author_ids: &[Uuid],
        page: Option<PageRequest>,
    ) -> Result<Vec<Post>>;

    /// Cheap store round-trip for readiness probes
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// Likes, unique per (user, post).
#[async_trait::async_trait]
pub trait LikeRepository: Send + Sync {
    async fn insert_like(&self, user_id: Uuid, post_id: Uuid) -> Result<LikeOutcome>;

    /// Returns true if a like was removed
    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;

    async fn is_liked_by(&self, user_id: Uuid, post_id: Uuid) -> Result<bool>;

    /// Subset of `post_ids` that `user_id` has liked
    async fn liked_post_ids(&self, user_id: Uuid, post_ids: &[Uuid]) -> Result<HashSet<Uuid>>;

    async fn like_count(&self, post_id: Uuid) -> Result<i64>;

    /// Counts for every requested post; posts without likes map to 0
    async fn like_counts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>>;
}

#[async_trait::async_trait]
pub trait CommentRepository: Send + Sync {
    /// Returns `None` when the post does not exist
    async fn insert_comment(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        text: Option<String>,
    ) -> Result<Option<Comment>>;

    /// Scoped lookup: a comment under a different post is treated as absent
    async fn get_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Option<Comment>>;

    /// Oldest first
    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>>;

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool>;

    async fn comment_count(&self, post_id: Uuid) -> Result<i64>;

    /// Counts for every requested post; posts without comments map to 0
    async fn comment_counts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>>;
}
