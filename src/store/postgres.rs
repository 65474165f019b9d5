// src/store/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{
    comment::{Comment, NewComment},
    media::Media,
    reaction::{Reaction, ReactionAction, ReactionType},
    user::Author,
};
use crate::store::{
    CommentStore, MediaResolver, Page, ProductCatalog, ReactionStore, StoreResult, UserDirectory,
};

const COMMENT_COLUMNS: &str = "id, author_id, product_id, comment_text, parent_id, rating, \
                               created_at, updated_at, media_ids, is_deleted";

/// PostgreSQL-backed implementation of every store seam.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgStore {
    async fn root_comments(
        &self,
        product_id: i64,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE product_id = $1 AND parent_id IS NULL
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(product_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load root comments: {:?}", e);
            e
        })?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM comments WHERE product_id = $1 AND parent_id IS NULL",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page { rows, total })
    }

    async fn descendants_of(
        &self,
        comment_id: i64,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Comment>> {
        // The anchor (depth 0) is always kept; only deeper rows are paginated.
        let rows = sqlx::query_as::<_, Comment>(&format!(
            r#"
            WITH RECURSIVE thread AS (
                SELECT {COMMENT_COLUMNS}, 0 AS depth
                FROM comments
                WHERE id = $1
                UNION ALL
                SELECT c.id, c.author_id, c.product_id, c.comment_text, c.parent_id, c.rating,
                       c.created_at, c.updated_at, c.media_ids, c.is_deleted, t.depth + 1
                FROM comments c
                JOIN thread t ON c.parent_id = t.id
            )
            SELECT * FROM (
                SELECT * FROM thread WHERE depth = 0
                UNION ALL
                (
                    SELECT * FROM thread
                    WHERE depth > 0
                    ORDER BY depth ASC, created_at DESC, id DESC
                    LIMIT $2 OFFSET $3
                )
            ) page
            ORDER BY depth ASC, created_at DESC, id DESC
            "#
        ))
        .bind(comment_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load answers of comment {}: {:?}", comment_id, e);
            e
        })?;

        if rows.is_empty() {
            return Ok(Page { rows, total: 0 });
        }

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            WITH RECURSIVE thread AS (
                SELECT id FROM comments WHERE parent_id = $1
                UNION ALL
                SELECT c.id FROM comments c JOIN thread t ON c.parent_id = t.id
            )
            SELECT COUNT(*) FROM thread
            "#,
        )
        .bind(comment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page { rows, total })
    }

    async fn direct_children_count(&self, comment_id: i64) -> StoreResult<u64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE parent_id = $1")
                .bind(comment_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.max(0) as u64)
    }

    async fn direct_children_counts(&self, comment_ids: &[i64]) -> StoreResult<HashMap<i64, u64>> {
        if comment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT parent_id, COUNT(*)
            FROM comments
            WHERE parent_id = ANY($1)
            GROUP BY parent_id
            "#,
        )
        .bind(comment_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut counts: HashMap<i64, u64> = comment_ids.iter().map(|&id| (id, 0)).collect();
        for (parent_id, count) in rows {
            counts.insert(parent_id, count.max(0) as u64);
        }
        Ok(counts)
    }

    async fn owned_by(&self, comment_id: i64, user_id: i64) -> StoreResult<bool> {
        let author_id =
            sqlx::query_scalar::<_, i64>("SELECT author_id FROM comments WHERE id = $1")
                .bind(comment_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(author_id == user_id)
    }

    async fn find(&self, comment_id: i64) -> StoreResult<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn insert(&self, comment: NewComment) -> StoreResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO comments (author_id, product_id, comment_text, parent_id, rating, media_ids)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(comment.author_id)
        .bind(comment.product_id)
        .bind(&comment.text)
        .bind(comment.parent_id)
        .bind(comment.rating)
        .bind(&comment.media_ids)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create comment: {:?}", e);
            e
        })?;

        Ok(id)
    }

    async fn update_text(&self, comment_id: i64, text: &str) -> StoreResult<()> {
        sqlx::query("UPDATE comments SET comment_text = $2, updated_at = NOW() WHERE id = $1")
            .bind(comment_id)
            .bind(text)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn soft_delete(&self, comment_id: i64) -> StoreResult<()> {
        sqlx::query("UPDATE comments SET comment_text = '', is_deleted = TRUE WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ReactionStore for PgStore {
    async fn by_comment_ids(&self, comment_ids: &[i64]) -> StoreResult<HashMap<i64, Vec<Reaction>>> {
        if comment_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let reactions = sqlx::query_as::<_, Reaction>(
            r#"
            SELECT user_id, comment_id, ty, added_at
            FROM comment_reactions
            WHERE comment_id = ANY($1)
            "#,
        )
        .bind(comment_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<Reaction>> = HashMap::new();
        for reaction in reactions {
            grouped.entry(reaction.comment_id).or_default().push(reaction);
        }
        Ok(grouped)
    }

    async fn get(&self, comment_id: i64, user_id: i64) -> StoreResult<Option<Reaction>> {
        let reaction = sqlx::query_as::<_, Reaction>(
            r#"
            SELECT user_id, comment_id, ty, added_at
            FROM comment_reactions
            WHERE comment_id = $1 AND user_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reaction)
    }

    async fn upsert_or_delete(
        &self,
        comment_id: i64,
        user_id: i64,
        ty: ReactionType,
    ) -> StoreResult<ReactionAction> {
        let mut tx = self.pool.begin().await?;

        // No row lock is taken: two concurrent toggles by the same user may race.
        let existing = sqlx::query_as::<_, Reaction>(
            r#"
            SELECT user_id, comment_id, ty, added_at
            FROM comment_reactions
            WHERE comment_id = $1 AND user_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let action = match existing {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO comment_reactions (user_id, comment_id, ty)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (user_id, comment_id) DO NOTHING
                    "#,
                )
                .bind(user_id)
                .bind(comment_id)
                .bind(ty)
                .execute(&mut *tx)
                .await?;
                ReactionAction::Created
            }
            Some(current) if current.ty == ty => {
                sqlx::query("DELETE FROM comment_reactions WHERE user_id = $1 AND comment_id = $2")
                    .bind(user_id)
                    .bind(comment_id)
                    .execute(&mut *tx)
                    .await?;
                ReactionAction::Deleted
            }
            Some(_) => {
                sqlx::query(
                    "UPDATE comment_reactions SET ty = $3 WHERE user_id = $1 AND comment_id = $2",
                )
                .bind(user_id)
                .bind(comment_id)
                .bind(ty)
                .execute(&mut *tx)
                .await?;
                ReactionAction::Updated
            }
        };

        tx.commit().await?;

        Ok(action)
    }
}

#[async_trait]
impl MediaResolver for PgStore {
    async fn resolve_media(&self, ids: &[i64]) -> StoreResult<Vec<Media>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let medias = sqlx::query_as::<_, Media>(
            "SELECT id, url, media_type, product_id FROM medias WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(medias)
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn resolve_users(&self, ids: &[i64]) -> StoreResult<HashMap<i64, Author>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, name, email, role FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(authors.into_iter().map(|a| (a.id, a)).collect())
    }
}

#[async_trait]
impl ProductCatalog for PgStore {
    async fn product_exists(&self, product_id: i64) -> StoreResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
