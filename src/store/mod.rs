// src/store/mod.rs
//
// Storage seams for the comment subsystem. Every handle is stateless over its
// backing store; nothing here caches between calls.

pub mod memory;
pub mod postgres;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;

use crate::models::{
    comment::{Comment, NewComment},
    media::Media,
    reaction::{Reaction, ReactionAction, ReactionType},
    user::Author,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Failure at the store boundary.
#[derive(Debug)]
pub enum StoreError {
    /// The addressed row does not exist (or is not visible to the caller).
    NotFound,
    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "row not found"),
            StoreError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Rows of one page plus the total number of rows the page was cut from.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: i64,
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Root comments of a product, newest first.
    async fn root_comments(&self, product_id: i64, limit: i64, offset: i64)
    -> StoreResult<Page<Comment>>;

    /// Every comment transitively below `comment_id`, ordered by depth then newest first.
    /// The anchor itself is always row zero and is not counted or paginated.
    /// Returns an empty page when the anchor does not exist.
    async fn descendants_of(&self, comment_id: i64, limit: i64, offset: i64)
    -> StoreResult<Page<Comment>>;

    async fn direct_children_count(&self, comment_id: i64) -> StoreResult<u64>;

    async fn direct_children_counts(&self, comment_ids: &[i64]) -> StoreResult<HashMap<i64, u64>> {
        let mut counts = HashMap::with_capacity(comment_ids.len());
        for &id in comment_ids {
            counts.insert(id, self.direct_children_count(id).await?);
        }
        Ok(counts)
    }

    /// `Err(NotFound)` when the comment does not exist at all.
    async fn owned_by(&self, comment_id: i64, user_id: i64) -> StoreResult<bool>;

    async fn find(&self, comment_id: i64) -> StoreResult<Option<Comment>>;

    async fn insert(&self, comment: NewComment) -> StoreResult<i64>;

    async fn update_text(&self, comment_id: i64, text: &str) -> StoreResult<()>;

    /// Clears the text and flags the row. Children are left untouched.
    async fn soft_delete(&self, comment_id: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait ReactionStore: Send + Sync {
    /// One batched read for a whole page of comments.
    async fn by_comment_ids(&self, comment_ids: &[i64]) -> StoreResult<HashMap<i64, Vec<Reaction>>>;

    async fn get(&self, comment_id: i64, user_id: i64) -> StoreResult<Option<Reaction>>;

    /// Absent -> create, same type -> delete, other type -> update (keeps `added_at`).
    async fn upsert_or_delete(
        &self,
        comment_id: i64,
        user_id: i64,
        ty: ReactionType,
    ) -> StoreResult<ReactionAction>;
}

#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Unknown ids are silently absent from the result.
    async fn resolve_media(&self, ids: &[i64]) -> StoreResult<Vec<Media>>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve_users(&self, ids: &[i64]) -> StoreResult<HashMap<i64, Author>>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn product_exists(&self, product_id: i64) -> StoreResult<bool>;
}
