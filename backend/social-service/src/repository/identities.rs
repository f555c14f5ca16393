use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Profile, UserSummary};
use crate::error::Result;
use crate::repository::IdentityDirectory;

const SUMMARY_COLUMNS: &str = r#"
    u.id, u.username, u.first_name, u.last_name, p.profile_pic
"#;

const PROFILE_COLUMNS: &str = r#"
    u.id AS user_id, u.username, u.email, u.first_name, u.last_name,
    p.profile_pic, p.date_of_birth, p.gender,
    COALESCE(p.created_at, u.created_at) AS created_at,
    COALESCE(p.updated_at, u.updated_at) AS updated_at
"#;

/// Identity lookups against the users/profiles tables
#[derive(Clone)]
pub struct PostgresIdentityDirectory {
    pool: PgPool,
}

impl PostgresIdentityDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl IdentityDirectory for PostgresIdentityDirectory {
    async fn get_summary(&self, user_id: Uuid) -> Result<Option<UserSummary>> {
        let query = format!(
            "SELECT {} FROM users u LEFT JOIN profiles p ON p.user_id = u.id WHERE u.id = $1",
            SUMMARY_COLUMNS
        );

        let summary = sqlx::query_as::<_, UserSummary>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(summary)
    }

    async fn get_summaries(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = format!(
            "SELECT {} FROM users u LEFT JOIN profiles p ON p.user_id = u.id WHERE u.id = ANY($1)",
            SUMMARY_COLUMNS
        );

        let summaries = sqlx::query_as::<_, UserSummary>(&query)
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(summaries.into_iter().map(|s| (s.id, s)).collect())
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let query = format!(
            "SELECT {} FROM users u LEFT JOIN profiles p ON p.user_id = u.id WHERE u.id = $1",
            PROFILE_COLUMNS
        );

        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn find_profile_by_username(&self, username: &str) -> Result<Option<Profile>> {
        let query = format!(
            "SELECT {} FROM users u LEFT JOIN profiles p ON p.user_id = u.id WHERE u.username = $1",
            PROFILE_COLUMNS
        );

        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    async fn search_profiles(&self, search: &str, limit: i64) -> Result<Vec<Profile>> {
        let query = format!(
            r#"
            SELECT {}
            FROM users u LEFT JOIN profiles p ON p.user_id = u.id
            WHERE u.username ILIKE $1 OR u.first_name ILIKE $1 OR u.last_name ILIKE $1
            ORDER BY u.username
            LIMIT $2
            "#,
            PROFILE_COLUMNS
        );

        let profiles = sqlx::query_as::<_, Profile>(&query)
            .bind(like_pattern(search))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(profiles)
    }
}

/// `%term%` with LIKE metacharacters escaped
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("bob"), "%bob%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern(""), "%%");
    }
}
