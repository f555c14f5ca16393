use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Profile;
use crate::error::{AppError, Result};
use crate::repository::IdentityDirectory;

/// Upper bound on profile search results
pub const SEARCH_LIMIT: i64 = 50;

/// Read-only profile lookups
#[derive(Clone)]
pub struct ProfileService {
    identities: Arc<dyn IdentityDirectory>,
}

impl ProfileService {
    pub fn new(identities: Arc<dyn IdentityDirectory>) -> Self {
        Self { identities }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Profile> {
        self.identities
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    pub async fn by_username(&self, username: &str) -> Result<Profile> {
        self.identities
            .find_profile_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Profile>> {
        self.identities
            .search_profiles(query.trim(), SEARCH_LIMIT)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    #[tokio::test]
    async fn test_profile_lookups() {
        let store = Arc::new(MemoryStore::new());
        let alice = store.register_user("alice").await;
        let service = ProfileService::new(store);

        assert_eq!(service.get(alice).await.unwrap().username, "alice");
        assert_eq!(service.by_username("alice").await.unwrap().user_id, alice);
        assert!(matches!(
            service.by_username("nobody").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.get(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(service.search(" ali ").await.unwrap().len(), 1);
    }
}
