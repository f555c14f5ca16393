use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{FollowEdge, FollowEdgeView};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::repository::{FollowRepository, IdentityDirectory};
use crate::services::{require_identity, resolve_summaries, summary_for};

/// Follow graph operations
#[derive(Clone)]
pub struct FollowService {
    follows: Arc<dyn FollowRepository>,
    identities: Arc<dyn IdentityDirectory>,
}

impl FollowService {
    pub fn new(follows: Arc<dyn FollowRepository>, identities: Arc<dyn IdentityDirectory>) -> Self {
        Self {
            follows,
            identities,
        }
    }

    /// Create the edge `follower -> followee`.
    ///
    /// Self-follows and unknown targets are `InvalidInput`, an existing edge is `Conflict`.
    pub async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<FollowEdgeView> {
        let result = self.create_edge(follower_id, followee_id).await;
        metrics::record_action("follow", &result);
        result
    }

    async fn create_edge(&self, follower_id: Uuid, followee_id: Uuid) -> Result<FollowEdgeView> {
        if follower_id == followee_id {
            return Err(AppError::InvalidInput("Cannot follow self".to_string()));
        }

        let follower = require_identity(self.identities.as_ref(), follower_id).await?;
        let followee = self
            .identities
            .get_summary(followee_id)
            .await?
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown user {}", followee_id)))?;

        let edge = self
            .follows
            .insert_follow(follower_id, followee_id)
            .await?
            .ok_or_else(|| AppError::Conflict("Already following".to_string()))?;

        tracing::info!(
            follower_id = %follower_id,
            followee_id = %followee_id,
            "follow created"
        );

        Ok(FollowEdgeView {
            id: edge.id,
            follower,
            following: followee,
            created_at: edge.created_at,
        })
    }

    /// Remove the edge `follower -> followee`; `NotFound` if it does not exist
    pub async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<()> {
        let result = match self.follows.delete_follow(follower_id, followee_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::NotFound("Not following this user".to_string())),
            Err(e) => Err(e),
        };
        metrics::record_action("unfollow", &result);

        if result.is_ok() {
            tracing::info!(
                follower_id = %follower_id,
                followee_id = %followee_id,
                "follow removed"
            );
        }
        result
    }

    /// Everyone `user_id` follows
    pub async fn followees_of(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        self.follows.followee_ids(user_id).await
    }

    pub async fn followers_of(&self, user_id: Uuid) -> Result<Vec<FollowEdgeView>> {
        let edges = self.follows.list_followers(user_id).await?;
        self.resolve(edges).await
    }

    pub async fn following_of(&self, user_id: Uuid) -> Result<Vec<FollowEdgeView>> {
        let edges = self.follows.list_following(user_id).await?;
        self.resolve(edges).await
    }

    async fn resolve(&self, edges: Vec<FollowEdge>) -> Result<Vec<FollowEdgeView>> {
        let summaries = resolve_summaries(
            self.identities.as_ref(),
            edges
                .iter()
                .flat_map(|e| [e.follower_id, e.followee_id]),
        )
        .await?;

        Ok(edges
            .into_iter()
            .map(|edge| FollowEdgeView {
                id: edge.id,
                follower: summary_for(&summaries, edge.follower_id),
                following: summary_for(&summaries, edge.followee_id),
                created_at: edge.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    async fn setup() -> (FollowService, Uuid, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let alice = store.register_user("alice").await;
        let bob = store.register_user("bob").await;
        (FollowService::new(store.clone(), store), alice, bob)
    }

    #[tokio::test]
    async fn test_follow_then_unfollow() {
        let (service, alice, bob) = setup().await;

        let view = service.follow(alice, bob).await.unwrap();
        assert_eq!(view.follower.username, "alice");
        assert_eq!(view.following.username, "bob");
        assert!(service.followees_of(alice).await.unwrap().contains(&bob));

        service.unfollow(alice, bob).await.unwrap();
        assert!(!service.followees_of(alice).await.unwrap().contains(&bob));
    }

    #[tokio::test]
    async fn test_duplicate_follow_is_conflict() {
        let (service, alice, bob) = setup().await;

        service.follow(alice, bob).await.unwrap();
        assert!(matches!(
            service.follow(alice, bob).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_follow_rejects_self_and_unknown_target() {
        let (service, alice, _) = setup().await;

        assert!(matches!(
            service.follow(alice, alice).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            service.follow(alice, Uuid::new_v4()).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_unfollow_without_edge_is_not_found() {
        let (service, alice, bob) = setup().await;

        assert!(matches!(
            service.unfollow(alice, bob).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_listings_resolve_both_ends() {
        let (service, alice, bob) = setup().await;
        service.follow(alice, bob).await.unwrap();

        let followers = service.followers_of(bob).await.unwrap();
        assert_eq!(followers.len(), 1);
        assert_eq!(followers[0].follower.id, alice);

        let following = service.following_of(alice).await.unwrap();
        assert_eq!(following[0].following.id, bob);
        assert!(service.following_of(bob).await.unwrap().is_empty());
    }
}
