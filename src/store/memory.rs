// src/store/memory.rs

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{
    comment::{Comment, NewComment},
    media::Media,
    reaction::{Reaction, ReactionAction, ReactionType},
    user::Author,
};
use crate::store::{
    CommentStore, MediaResolver, Page, ProductCatalog, ReactionStore, StoreError, StoreResult,
    UserDirectory,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    comments: BTreeMap<i64, Comment>,
    reactions: HashMap<(i64, i64), Reaction>,
    users: HashMap<i64, Author>,
    products: HashSet<i64>,
    medias: HashMap<i64, Media>,
}

/// In-process store for tests and local development.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, author: Author) {
        self.tables.write().await.users.insert(author.id, author);
    }

    pub async fn add_product(&self, product_id: i64) {
        self.tables.write().await.products.insert(product_id);
    }

    pub async fn add_media(&self, media: Media) {
        self.tables.write().await.medias.insert(media.id, media);
    }

    pub async fn comment(&self, comment_id: i64) -> Option<Comment> {
        self.tables.read().await.comments.get(&comment_id).cloned()
    }

    pub async fn reactions_on(&self, comment_id: i64) -> Vec<Reaction> {
        self.tables
            .read()
            .await
            .reactions
            .values()
            .filter(|r| r.comment_id == comment_id)
            .cloned()
            .collect()
    }
}

/// Newest first, ties broken by the higher id.
fn newest_first(a: &Comment, b: &Comment) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

fn paginate<T>(rows: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    rows.into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn root_comments(
        &self,
        product_id: i64,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Comment>> {
        let tables = self.tables.read().await;
        let mut roots: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.product_id == product_id && c.parent_id.is_none())
            .cloned()
            .collect();
        roots.sort_by(newest_first);

        let total = roots.len() as i64;
        Ok(Page {
            rows: paginate(roots, limit, offset),
            total,
        })
    }

    async fn descendants_of(
        &self,
        comment_id: i64,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Page<Comment>> {
        let tables = self.tables.read().await;
        let Some(anchor) = tables.comments.get(&comment_id).cloned() else {
            return Ok(Page {
                rows: Vec::new(),
                total: 0,
            });
        };

        let mut children: HashMap<i64, Vec<&Comment>> = HashMap::new();
        for comment in tables.comments.values() {
            if let Some(parent_id) = comment.parent_id {
                children.entry(parent_id).or_default().push(comment);
            }
        }

        // Breadth-first from the anchor, one level at a time.
        let mut seen = HashSet::from([comment_id]);
        let mut found: Vec<(usize, Comment)> = Vec::new();
        let mut queue = VecDeque::from([(comment_id, 0usize)]);
        while let Some((id, depth)) = queue.pop_front() {
            for child in children.get(&id).into_iter().flatten() {
                if seen.insert(child.id) {
                    found.push((depth + 1, (*child).clone()));
                    queue.push_back((child.id, depth + 1));
                }
            }
        }

        found.sort_by(|(da, a), (db, b)| da.cmp(db).then_with(|| newest_first(a, b)));
        let total = found.len() as i64;

        let mut rows = Vec::with_capacity(limit.max(0) as usize + 1);
        rows.push(anchor);
        rows.extend(paginate(found, limit, offset).into_iter().map(|(_, c)| c));

        Ok(Page { rows, total })
    }

    async fn direct_children_count(&self, comment_id: i64) -> StoreResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.parent_id == Some(comment_id))
            .count() as u64)
    }

    async fn owned_by(&self, comment_id: i64, user_id: i64) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        tables
            .comments
            .get(&comment_id)
            .map(|c| c.author_id == user_id)
            .ok_or(StoreError::NotFound)
    }

    async fn find(&self, comment_id: i64) -> StoreResult<Option<Comment>> {
        Ok(self.comment(comment_id).await)
    }

    async fn insert(&self, comment: NewComment) -> StoreResult<i64> {
        let mut tables = self.tables.write().await;
        tables.next_id += 1;
        let id = tables.next_id;

        tables.comments.insert(
            id,
            Comment {
                id,
                author_id: comment.author_id,
                product_id: comment.product_id,
                text: comment.text,
                parent_id: comment.parent_id,
                rating: comment.rating,
                created_at: Utc::now(),
                updated_at: None,
                media_ids: comment.media_ids,
                deleted: false,
            },
        );

        Ok(id)
    }

    async fn update_text(&self, comment_id: i64, text: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let comment = tables
            .comments
            .get_mut(&comment_id)
            .ok_or(StoreError::NotFound)?;
        comment.text = text.to_string();
        comment.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn soft_delete(&self, comment_id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let comment = tables
            .comments
            .get_mut(&comment_id)
            .ok_or(StoreError::NotFound)?;
        comment.text.clear();
        comment.deleted = true;
        Ok(())
    }
}

#[async_trait]
impl ReactionStore for MemoryStore {
    async fn by_comment_ids(&self, comment_ids: &[i64]) -> StoreResult<HashMap<i64, Vec<Reaction>>> {
        let wanted: HashSet<i64> = comment_ids.iter().copied().collect();
        let tables = self.tables.read().await;

        let mut grouped: HashMap<i64, Vec<Reaction>> = HashMap::new();
        for reaction in tables.reactions.values() {
            if wanted.contains(&reaction.comment_id) {
                grouped
                    .entry(reaction.comment_id)
                    .or_default()
                    .push(reaction.clone());
            }
        }
        Ok(grouped)
    }

    async fn get(&self, comment_id: i64, user_id: i64) -> StoreResult<Option<Reaction>> {
        let tables = self.tables.read().await;
        Ok(tables.reactions.get(&(user_id, comment_id)).cloned())
    }

    async fn upsert_or_delete(
        &self,
        comment_id: i64,
        user_id: i64,
        ty: ReactionType,
    ) -> StoreResult<ReactionAction> {
        let mut tables = self.tables.write().await;
        let key = (user_id, comment_id);

        let action = match tables.reactions.get(&key).map(|r| r.ty) {
            None => {
                tables.reactions.insert(
                    key,
                    Reaction {
                        user_id,
                        comment_id,
                        ty,
                        added_at: Utc::now(),
                    },
                );
                ReactionAction::Created
            }
            Some(current) if current == ty => {
                tables.reactions.remove(&key);
                ReactionAction::Deleted
            }
            Some(_) => {
                if let Some(reaction) = tables.reactions.get_mut(&key) {
                    reaction.ty = ty;
                }
                ReactionAction::Updated
            }
        };

        Ok(action)
    }
}

#[async_trait]
impl MediaResolver for MemoryStore {
    async fn resolve_media(&self, ids: &[i64]) -> StoreResult<Vec<Media>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.medias.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn resolve_users(&self, ids: &[i64]) -> StoreResult<HashMap<i64, Author>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).map(|a| (*id, a.clone())))
            .collect())
    }
}

#[async_trait]
impl ProductCatalog for MemoryStore {
    async fn product_exists(&self, product_id: i64) -> StoreResult<bool> {
        Ok(self.tables.read().await.products.contains(&product_id))
    }
}
