pub mod engagement;
pub mod feed;
pub mod follow;
pub mod posts;
pub mod profiles;

pub use engagement::{EngagementService, NewComment};
pub use feed::{FeedPage, FeedService};
pub use follow::FollowService;
pub use posts::{CreatePost, PostService, UpdatePost};
pub use profiles::ProfileService;

use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::UserSummary;
use crate::error::{AppError, Result};
use crate::repository::IdentityDirectory;

/// Resolves the acting identity; unknown callers may not write under their id
pub(crate) async fn require_identity(
    identities: &dyn IdentityDirectory,
    user_id: Uuid,
) -> Result<UserSummary> {
    identities
        .get_summary(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized(format!("Unknown user {}", user_id)))
}

/// Batched author lookup; authors missing from the directory get a placeholder
pub(crate) async fn resolve_summaries(
    identities: &dyn IdentityDirectory,
    user_ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, UserSummary>> {
    let mut ids: Vec<Uuid> = user_ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let mut summaries = identities.get_summaries(&ids).await?;
    for id in ids {
        summaries
            .entry(id)
            .or_insert_with(|| UserSummary::placeholder(id));
    }
    Ok(summaries)
}

/// Pulls a summary out of a map built by [`resolve_summaries`]
pub(crate) fn summary_for(summaries: &HashMap<Uuid, UserSummary>, id: Uuid) -> UserSummary {
    summaries
        .get(&id)
        .cloned()
        .unwrap_or_else(|| UserSummary::placeholder(id))
}
