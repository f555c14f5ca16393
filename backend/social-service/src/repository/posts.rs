use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{NewPost, PageRequest, Post, PostChanges, PostKind};
use crate::error::{AppError, Result};
use crate::repository::PostRepository;

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    caption: String,
    image: Option<String>,
    kind: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = AppError;

    fn try_from(row: PostRow) -> Result<Self> {
        let kind = PostKind::from_code(&row.kind).ok_or_else(|| {
            AppError::Internal(format!("post {} has unknown kind '{}'", row.id, row.kind))
        })?;

        Ok(Post {
            id: row.id,
            user_id: row.user_id,
            caption: row.caption,
            image: row.image,
            kind,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for posts
#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, user_id, caption, image, kind, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING id, user_id, caption, image, kind, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(post.user_id)
        .bind(post.caption)
        .bind(post.image)
        .bind(post.kind.as_code())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, caption, image, kind, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Post::try_from).transpose()
    }

    async fn update_post(&self, post_id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let (set_image, image) = match changes.image {
            Some(image) => (true, image),
            None => (false, None),
        };

        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET caption = COALESCE($2, caption),
                image = CASE WHEN $3 THEN $4 ELSE image END,
                kind = COALESCE($5, kind),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, caption, image, kind, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(changes.caption)
        .bind(set_image)
        .bind(image)
        .bind(changes.kind.map(|k| k.as_code()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Post::try_from).transpose()
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        // likes and comments go with it through ON DELETE CASCADE
        let affected = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(affected > 0)
    }

    async fn list_by_authors(
        &self,
        author_ids: &[Uuid],
        page: Option<PageRequest>,
    ) -> Result<Vec<Post>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let after = page.and_then(|p| p.after);
        let limit = page.map(|p| p.limit as i64);

        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, caption, image, kind, created_at, updated_at
            FROM posts
            WHERE user_id = ANY($1)
              AND ($2::timestamptz IS NULL OR (created_at, id) < ($2::timestamptz, $3::uuid))
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            "#,
        )
        .bind(author_ids)
        .bind(after.map(|c| c.created_at))
        .bind(after.map(|c| c.id))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Post::try_from).collect()
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
