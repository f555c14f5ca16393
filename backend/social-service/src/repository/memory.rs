//! In-memory backend for local development and tests.
//!
//! All state sits behind one lock, so a cascade delete or a uniqueness check
//! plus insert is a single critical section.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    Comment, FollowEdge, Like, LikeOutcome, NewPost, PageRequest, Post, PostChanges, Profile,
    UserSummary,
};
use crate::error::Result;
use crate::repository::{
    CommentRepository, FollowRepository, IdentityDirectory, LikeRepository, PostRepository,
};

#[derive(Default)]
struct MemoryState {
    profiles: HashMap<Uuid, Profile>,
    follows: Vec<FollowEdge>,
    posts: HashMap<Uuid, Post>,
    likes: HashMap<(Uuid, Uuid), Like>,
    comments: Vec<Comment>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Strictly increasing, microsecond precision (matches TIMESTAMPTZ)
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(6);
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stand-in for the user-management collaborator: add or replace an identity
    pub async fn upsert_profile(&self, profile: Profile) {
        let mut state = self.state.write().await;
        state.profiles.insert(profile.user_id, profile);
    }

    /// Convenience for seeding: creates a profile with sensible defaults
    pub async fn register_user(&self, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.upsert_profile(Profile {
            user_id: id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: String::new(),
            last_name: String::new(),
            profile_pic: None,
            date_of_birth: None,
            gender: None,
            created_at: now,
            updated_at: now,
        })
        .await;
        id
    }
}

#[async_trait::async_trait]
impl IdentityDirectory for MemoryStore {
    async fn get_summary(&self, user_id: Uuid) -> Result<Option<UserSummary>> {
        let state = self.state.read().await;
        Ok(state.profiles.get(&user_id).map(Profile::summary))
    }

    async fn get_summaries(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>> {
        let state = self.state.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| state.profiles.get(id).map(|p| (*id, p.summary())))
            .collect())
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let state = self.state.read().await;
        Ok(state.profiles.get(&user_id).cloned())
    }

    async fn find_profile_by_username(&self, username: &str) -> Result<Option<Profile>> {
        let state = self.state.read().await;
        Ok(state
            .profiles
            .values()
            .find(|p| p.username == username)
            .cloned())
    }

    async fn search_profiles(&self, query: &str, limit: i64) -> Result<Vec<Profile>> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;

        let mut matches: Vec<Profile> = state
            .profiles
            .values()
            .filter(|p| {
                p.username.to_lowercase().contains(&needle)
                    || p.first_name.to_lowercase().contains(&needle)
                    || p.last_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.username.cmp(&b.username));
        matches.truncate(limit.max(0) as usize);

        Ok(matches)
    }
}

#[async_trait::async_trait]
impl FollowRepository for MemoryStore {
    async fn insert_follow(
        &self,
        follower_id: Uuid,
        followee_id: Uuid,
    ) -> Result<Option<FollowEdge>> {
        let mut state = self.state.write().await;
        if state
            .follows
            .iter()
            .any(|e| e.follower_id == follower_id && e.followee_id == followee_id)
        {
            return Ok(None);
        }

        let edge = FollowEdge {
            id: Uuid::new_v4(),
            follower_id,
            followee_id,
            created_at: state.next_timestamp(),
        };
        state.follows.push(edge.clone());
        Ok(Some(edge))
    }

    async fn delete_follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.follows.len();
        state
            .follows
            .retain(|e| !(e.follower_id == follower_id && e.followee_id == followee_id));
        Ok(state.follows.len() < before)
    }

    async fn followee_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .filter(|e| e.follower_id == user_id)
            .map(|e| e.followee_id)
            .collect())
    }

    async fn list_followers(&self, user_id: Uuid) -> Result<Vec<FollowEdge>> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .filter(|e| e.followee_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_following(&self, user_id: Uuid) -> Result<Vec<FollowEdge>> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .filter(|e| e.follower_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl PostRepository for MemoryStore {
    async fn insert_post(&self, new: NewPost) -> Result<Post> {
        let mut state = self.state.write().await;
        let now = state.next_timestamp();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            caption: new.caption,
            image: new.image,
            kind: new.kind,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let state = self.state.read().await;
        Ok(state.posts.get(&post_id).cloned())
    }

    async fn update_post(&self, post_id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Ok(None);
        }
        let now = state.next_timestamp();

        let Some(post) = state.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        if let Some(caption) = changes.caption {
            post.caption = caption;
        }
        if let Some(image) = changes.image {
            post.image = image;
        }
        if let Some(kind) = changes.kind {
            post.kind = kind;
        }
        post.updated_at = now;

        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.posts.remove(&post_id).is_none() {
            return Ok(false);
        }
        state.likes.retain(|(_, liked_post), _| *liked_post != post_id);
        state.comments.retain(|c| c.post_id != post_id);
        Ok(true)
    }

    async fn list_by_authors(
        &self,
        author_ids: &[Uuid],
        page: Option<PageRequest>,
    ) -> Result<Vec<Post>> {
        let authors: HashSet<&Uuid> = author_ids.iter().collect();
        let after = page.and_then(|p| p.after);
        let state = self.state.read().await;

        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|p| authors.contains(&p.user_id))
            .filter(|p| after.map_or(true, |cursor| cursor.precedes(p)))
            .cloned()
            .collect();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        if let Some(page) = page {
            posts.truncate(page.limit);
        }

        Ok(posts)
    }
}

#[async_trait::async_trait]
impl LikeRepository for MemoryStore {
    async fn insert_like(&self, user_id: Uuid, post_id: Uuid) -> Result<LikeOutcome> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Ok(LikeOutcome::PostMissing);
        }
        if state.likes.contains_key(&(user_id, post_id)) {
            return Ok(LikeOutcome::AlreadyLiked);
        }

        let like = Like {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            created_at: state.next_timestamp(),
        };
        state.likes.insert((user_id, post_id), like.clone());
        Ok(LikeOutcome::Created(like))
    }

    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        Ok(state.likes.remove(&(user_id, post_id)).is_some())
    }

    async fn is_liked_by(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.likes.contains_key(&(user_id, post_id)))
    }

    async fn liked_post_ids(&self, user_id: Uuid, post_ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        let state = self.state.read().await;
        Ok(post_ids
            .iter()
            .filter(|post_id| state.likes.contains_key(&(user_id, **post_id)))
            .copied()
            .collect())
    }

    async fn like_count(&self, post_id: Uuid) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state.likes.keys().filter(|(_, p)| *p == post_id).count() as i64)
    }

    async fn like_counts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
        let mut counts: HashMap<Uuid, i64> = post_ids.iter().map(|id| (*id, 0)).collect();
        let state = self.state.read().await;
        for (_, post_id) in state.likes.keys() {
            if let Some(count) = counts.get_mut(post_id) {
                *count += 1;
            }
        }
        Ok(counts)
    }
}

#[async_trait::async_trait]
impl CommentRepository for MemoryStore {
    async fn insert_comment(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        text: Option<String>,
    ) -> Result<Option<Comment>> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Ok(None);
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            text,
            created_at: state.next_timestamp(),
        };
        state.comments.push(comment.clone());
        Ok(Some(comment))
    }

    async fn get_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Option<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .iter()
            .find(|c| c.id == comment_id && c.post_id == post_id)
            .cloned())
    }

    async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state.comments.retain(|c| c.id != comment_id);
        Ok(state.comments.len() < before)
    }

    async fn comment_count(&self, post_id: Uuid) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state.comments.iter().filter(|c| c.post_id == post_id).count() as i64)
    }

    async fn comment_counts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
        let mut counts: HashMap<Uuid, i64> = post_ids.iter().map(|id| (*id, 0)).collect();
        let state = self.state.read().await;
        for comment in &state.comments {
            if let Some(count) = counts.get_mut(&comment.post_id) {
                *count += 1;
            }
        }
        Ok(counts)
    }
}
