use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{FeedItem, NewPost, Post, PostChanges, PostKind};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::repository::{IdentityDirectory, PostRepository};
use crate::services::{require_identity, FeedService};

pub const MAX_IMAGE_CHARS: u64 = 512;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreatePost {
    #[validate(length(max = 2200, message = "caption exceeds 2200 characters"))]
    pub caption: String,
    pub image: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: PostKind,
}

/// Partial update. An explicit `"image": null` clears the image.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePost {
    #[validate(length(max = 2200, message = "caption exceeds 2200 characters"))]
    pub caption: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub image: Option<Option<String>>,
    #[serde(rename = "type")]
    pub kind: Option<PostKind>,
}

fn check_image(image: Option<&str>) -> Result<()> {
    match image {
        Some(image) if image.chars().count() as u64 > MAX_IMAGE_CHARS => Err(
            AppError::InvalidInput(format!(
                "image reference exceeds {} characters",
                MAX_IMAGE_CHARS
            )),
        ),
        _ => Ok(()),
    }
}

/// Distinguishes a field sent as `null` from one left out
fn present<'de, D, T>(de: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl UpdatePost {
    fn into_changes(self) -> Result<PostChanges> {
        self.validate()?;
        check_image(self.image.as_ref().and_then(|i| i.as_deref()))?;

        Ok(PostChanges {
            caption: self.caption,
            image: self.image,
            kind: self.kind,
        })
    }
}

/// Post lifecycle; mutations are restricted to the post's author
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    identities: Arc<dyn IdentityDirectory>,
    feed: FeedService,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        identities: Arc<dyn IdentityDirectory>,
        feed: FeedService,
    ) -> Self {
        Self {
            posts,
            identities,
            feed,
        }
    }

    pub async fn create(&self, author: Uuid, input: CreatePost) -> Result<FeedItem> {
        let result = self.insert(author, input).await;
        metrics::record_action("create_post", &result);
        result
    }

    async fn insert(&self, author: Uuid, input: CreatePost) -> Result<FeedItem> {
        input.validate()?;
        check_image(input.image.as_deref())?;
        require_identity(self.identities.as_ref(), author).await?;

        let post = self
            .posts
            .insert_post(NewPost {
                user_id: author,
                caption: input.caption,
                image: input.image,
                kind: input.kind,
            })
            .await?;

        tracing::info!(user_id = %author, post_id = %post.id, "post created");
        self.feed.describe(author, post).await
    }

    /// Post as seen by `viewer`
    pub async fn get(&self, viewer: Uuid, post_id: Uuid) -> Result<FeedItem> {
        let post = self.find(post_id).await?;
        self.feed.describe(viewer, post).await
    }

    pub async fn update(&self, actor: Uuid, post_id: Uuid, input: UpdatePost) -> Result<FeedItem> {
        let result = self.apply_update(actor, post_id, input).await;
        metrics::record_action("update_post", &result);
        result
    }

    async fn apply_update(&self, actor: Uuid, post_id: Uuid, input: UpdatePost) -> Result<FeedItem> {
        let changes = input.into_changes()?;
        self.owned_by(actor, post_id).await?;

        let post = self
            .posts
            .update_post(post_id, changes)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;

        tracing::info!(user_id = %actor, post_id = %post_id, "post updated");
        self.feed.describe(actor, post).await
    }

    /// Deletes the post with its likes and comments
    pub async fn delete(&self, actor: Uuid, post_id: Uuid) -> Result<()> {
        let result = self.remove(actor, post_id).await;
        metrics::record_action("delete_post", &result);
        result
    }

    async fn remove(&self, actor: Uuid, post_id: Uuid) -> Result<()> {
        self.owned_by(actor, post_id).await?;

        if !self.posts.delete_post(post_id).await? {
            return Err(post_not_found(post_id));
        }

        tracing::info!(user_id = %actor, post_id = %post_id, "post deleted");
        Ok(())
    }

    async fn find(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| post_not_found(post_id))
    }

    async fn owned_by(&self, actor: Uuid, post_id: Uuid) -> Result<Post> {
        let post = self.find(post_id).await?;
        if post.user_id != actor {
            return Err(AppError::Forbidden(
                "Only the author can modify this post".to_string(),
            ));
        }
        Ok(post)
    }
}

fn post_not_found(post_id: Uuid) -> AppError {
    AppError::NotFound(format!("Post {} not found", post_id))
}
