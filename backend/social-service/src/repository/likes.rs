use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Like, LikeOutcome};
use crate::error::Result;
use crate::repository::LikeRepository;

/// Repository for Like operations
#[derive(Clone)]
pub struct PostgresLikeRepository {
    pool: PgPool,
}

impl PostgresLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn post_exists(&self, post_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}

#[async_trait::async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn insert_like(&self, user_id: Uuid, post_id: Uuid) -> Result<LikeOutcome> {
        // The unique constraint decides races between concurrent likes of the same pair.
        let inserted = sqlx::query_as::<_, Like>(
            r#"
            INSERT INTO likes (id, user_id, post_id, created_at)
            SELECT $1, $2, $3, NOW()
            WHERE EXISTS (SELECT 1 FROM posts WHERE id = $3)
            ON CONFLICT (user_id, post_id) DO NOTHING
            RETURNING id, user_id, post_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await;

        match inserted {
            Ok(Some(like)) => Ok(LikeOutcome::Created(like)),
            Ok(None) => {
                if self.post_exists(post_id).await? {
                    Ok(LikeOutcome::AlreadyLiked)
                } else {
                    Ok(LikeOutcome::PostMissing)
                }
            }
            // post deleted between the EXISTS check and the insert
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Ok(LikeOutcome::PostMissing)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM likes
            WHERE user_id = $1 AND post_id = $2
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_liked_by(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM likes
                WHERE user_id = $1 AND post_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn liked_post_ids(&self, user_id: Uuid, post_ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let liked: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT post_id
            FROM likes
            WHERE user_id = $1 AND post_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(liked.into_iter().collect())
    }

    async fn like_count(&self, post_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn like_counts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
        let mut counts: HashMap<Uuid, i64> = post_ids.iter().map(|id| (*id, 0)).collect();
        if post_ids.is_empty() {
            return Ok(counts);
        }

        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT post_id, COUNT(*)
            FROM likes
            WHERE post_id = ANY($1)
            GROUP BY post_id
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        counts.extend(rows);
        Ok(counts)
    }
}
