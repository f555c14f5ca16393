use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::{Comment, CommentView, Like, LikeOutcome};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::repository::{CommentRepository, IdentityDirectory, LikeRepository, PostRepository};
use crate::services::{require_identity, resolve_summaries, summary_for};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewComment {
    #[validate(length(max = 1000, message = "comment exceeds 1000 characters"))]
    pub text: Option<String>,
}

/// Likes and comments
#[derive(Clone)]
pub struct EngagementService {
    posts: Arc<dyn PostRepository>,
    likes: Arc<dyn LikeRepository>,
    comments: Arc<dyn CommentRepository>,
    identities: Arc<dyn IdentityDirectory>,
}

impl EngagementService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        likes: Arc<dyn LikeRepository>,
        comments: Arc<dyn CommentRepository>,
        identities: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            posts,
            likes,
            comments,
            identities,
        }
    }

    // ========== Likes ==========

    /// `Conflict` if already liked, `NotFound` if the post is absent
    pub async fn like(&self, user_id: Uuid, post_id: Uuid) -> Result<Like> {
        let result = self.insert_like(user_id, post_id).await;
        metrics::record_action("like", &result);
        result
    }

    async fn insert_like(&self, user_id: Uuid, post_id: Uuid) -> Result<Like> {
        require_identity(self.identities.as_ref(), user_id).await?;

        match self.likes.insert_like(user_id, post_id).await? {
            LikeOutcome::Created(like) => {
                tracing::info!(user_id = %user_id, post_id = %post_id, "post liked");
                Ok(like)
            }
            LikeOutcome::AlreadyLiked => Err(AppError::Conflict("already liked".to_string())),
            LikeOutcome::PostMissing => Err(post_not_found(post_id)),
        }
    }

    /// `NotFound` if the caller has no live like on the post
    pub async fn unlike(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        let result = match self.likes.delete_like(user_id, post_id).await {
            Ok(true) => {
                tracing::info!(user_id = %user_id, post_id = %post_id, "post unliked");
                Ok(())
            }
            Ok(false) => Err(AppError::NotFound("Like not found".to_string())),
            Err(e) => Err(e),
        };
        metrics::record_action("unlike", &result);
        result
    }

    pub async fn is_liked_by(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.likes.is_liked_by(user_id, post_id).await
    }

    pub async fn like_count(&self, post_id: Uuid) -> Result<i64> {
        self.likes.like_count(post_id).await
    }

    pub async fn comment_count(&self, post_id: Uuid) -> Result<i64> {
        self.comments.comment_count(post_id).await
    }

    // ========== Comments ==========

    pub async fn add_comment(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        input: NewComment,
    ) -> Result<CommentView> {
        let result = self.insert_comment(user_id, post_id, input).await;
        metrics::record_action("comment", &result);
        result
    }

    async fn insert_comment(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        input: NewComment,
    ) -> Result<CommentView> {
        input.validate()?;
        let author = require_identity(self.identities.as_ref(), user_id).await?;

        let comment = self
            .comments
            .insert_comment(user_id, post_id, input.text)
            .await?
            .ok_or_else(|| post_not_found(post_id))?;

        tracing::info!(
            user_id = %user_id,
            post_id = %post_id,
            comment_id = %comment.id,
            "comment added"
        );

        Ok(CommentView {
            id: comment.id,
            user: author,
            post: comment.post_id,
            text: comment.text,
            created_at: comment.created_at,
        })
    }

    /// `NotFound` if absent or attached to a different post
    pub async fn get_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<CommentView> {
        let comment = self.find_comment(post_id, comment_id).await?;
        let mut views = self.resolve(vec![comment]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal("empty comment resolution".to_string()))
    }

    /// Comments on a post, oldest first
    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentView>> {
        if self.posts.get_post(post_id).await?.is_none() {
            return Err(post_not_found(post_id));
        }

        let comments = self.comments.list_comments(post_id).await?;
        self.resolve(comments).await
    }

    /// Only the comment's author may delete it
    pub async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid, actor: Uuid) -> Result<()> {
        let result = self.remove_comment(post_id, comment_id, actor).await;
        metrics::record_action("delete_comment", &result);
        result
    }

    async fn remove_comment(&self, post_id: Uuid, comment_id: Uuid, actor: Uuid) -> Result<()> {
        let comment = self.find_comment(post_id, comment_id).await?;
        if comment.user_id != actor {
            return Err(AppError::Forbidden(
                "Only the author can delete this comment".to_string(),
            ));
        }

        if !self.comments.delete_comment(comment_id).await? {
            return Err(comment_not_found(comment_id));
        }

        tracing::info!(
            user_id = %actor,
            post_id = %post_id,
            comment_id = %comment_id,
            "comment deleted"
        );
        Ok(())
    }

    async fn find_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment> {
        self.comments
            .get_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| comment_not_found(comment_id))
    }

    async fn resolve(&self, comments: Vec<Comment>) -> Result<Vec<CommentView>> {
        let authors =
            resolve_summaries(self.identities.as_ref(), comments.iter().map(|c| c.user_id))
                .await?;

        Ok(comments
            .into_iter()
            .map(|c| CommentView {
                id: c.id,
                user: summary_for(&authors, c.user_id),
                post: c.post_id,
                text: c.text,
                created_at: c.created_at,
            })
            .collect())
    }
}

fn post_not_found(post_id: Uuid) -> AppError {
    AppError::NotFound(format!("Post {} not found", post_id))
}

fn comment_not_found(comment_id: Uuid) -> AppError {
    AppError::NotFound(format!("Comment {} not found", comment_id))
}
