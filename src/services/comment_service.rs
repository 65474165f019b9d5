// src/services/comment_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use validator::Validate;

use crate::error::AppError;
use crate::models::{
    comment::{
        Comment, CommentView, CommentsPage, CreateCommentRequest, EditCommentRequest, NewComment,
        PageRequest,
    },
    reaction::ReactionType,
};
use crate::services::{aggregator, tree};
use crate::store::{
    CommentStore, MediaResolver, ProductCatalog, ReactionStore, StoreError, UserDirectory,
};
use crate::utils::html::clean_html;

/// Same message for "does not exist" and "not yours", so callers learn nothing
/// about comments they cannot act on.
const NOT_OWNER: &str = "Comment not found or you are not its author";

/// Upper bound on stored text, counted after sanitising.
const MAX_TEXT_CHARS: usize = 2000;

/// Composes the stores into the public comment operations.
///
/// Holds no state of its own; each call re-reads from the stores. The comment
/// page and its reactions are two separate reads, so a reaction landing in
/// between shows up on the next request only.
pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    reactions: Arc<dyn ReactionStore>,
    media: Arc<dyn MediaResolver>,
    users: Arc<dyn UserDirectory>,
    products: Arc<dyn ProductCatalog>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentStore>,
        reactions: Arc<dyn ReactionStore>,
        media: Arc<dyn MediaResolver>,
        users: Arc<dyn UserDirectory>,
        products: Arc<dyn ProductCatalog>,
    ) -> Self {
        Self {
            comments,
            reactions,
            media,
            users,
            products,
        }
    }

    /// Wires every seam to one backing store.
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: CommentStore + ReactionStore + MediaResolver + UserDirectory + ProductCatalog + 'static,
    {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
        )
    }

    /// Root comments of a product, flat, newest first.
    pub async fn list_roots(
        &self,
        product_id: i64,
        viewer_id: Option<i64>,
        page: PageRequest,
    ) -> Result<CommentsPage, AppError> {
        let roots = self
            .comments
            .root_comments(product_id, page.limit, page.offset)
            .await?;

        let views = self.hydrate(roots.rows, viewer_id).await?;

        Ok(CommentsPage {
            comments: tree::build_tree(views, None),
            total_count: roots.total,
        })
    }

    /// Nested answers below `comment_id`. The target itself is not part of the payload.
    pub async fn list_answers(
        &self,
        product_id: i64,
        viewer_id: Option<i64>,
        comment_id: i64,
        page: PageRequest,
    ) -> Result<CommentsPage, AppError> {
        let thread = self
            .comments
            .descendants_of(comment_id, page.limit, page.offset)
            .await?;

        let anchored = thread
            .rows
            .first()
            .is_some_and(|anchor| anchor.id == comment_id && anchor.product_id == product_id);
        if !anchored {
            tracing::debug!(
                "Comment {} not found under product {}, returning no answers",
                comment_id,
                product_id
            );
            return Ok(CommentsPage::empty(0));
        }

        let views = self.hydrate(thread.rows, viewer_id).await?;

        Ok(CommentsPage {
            comments: tree::build_tree(views, Some(comment_id)),
            total_count: thread.total,
        })
    }

    pub async fn add_comment(
        &self,
        author_id: i64,
        product_id: i64,
        input: CreateCommentRequest,
    ) -> Result<i64, AppError> {
        input.validate()?;
        let text = sanitize(&input.text)?;

        if !self.products.product_exists(product_id).await? {
            return Err(AppError::NotFound("Product not found".to_string()));
        }

        if let Some(parent_id) = input.parent_id {
            let parent = self.comments.find(parent_id).await?;
            if !parent.is_some_and(|p| p.product_id == product_id) {
                return Err(AppError::NotFound("Parent comment not found".to_string()));
            }
        }

        let id = self
            .comments
            .insert(NewComment {
                author_id,
                product_id,
                parent_id: input.parent_id,
                text,
                rating: input.rating,
                media_ids: input.media_ids,
            })
            .await?;

        tracing::info!("User {} commented {} on product {}", author_id, id, product_id);
        Ok(id)
    }

    pub async fn edit_comment(
        &self,
        comment_id: i64,
        user_id: i64,
        input: EditCommentRequest,
    ) -> Result<i64, AppError> {
        let comment = self.owned_comment(comment_id, user_id).await?;

        input.validate()?;
        let text = sanitize(&input.text)?;

        if comment.deleted {
            return Err(AppError::BadRequest(
                "Deleted comments cannot be edited".to_string(),
            ));
        }

        self.comments.update_text(comment_id, &text).await?;
        Ok(comment_id)
    }

    /// Soft delete: the row stays as a placeholder so its answers remain reachable.
    pub async fn delete_comment(&self, comment_id: i64, user_id: i64) -> Result<i64, AppError> {
        self.owned_comment(comment_id, user_id).await?;
        self.comments.soft_delete(comment_id).await?;

        tracing::info!("User {} deleted comment {}", user_id, comment_id);
        Ok(comment_id)
    }

    /// Toggles the caller's reaction. The result never reveals which branch ran.
    pub async fn set_reaction(
        &self,
        comment_id: i64,
        user_id: i64,
        ty: ReactionType,
    ) -> Result<i64, AppError> {
        if self.comments.find(comment_id).await?.is_none() {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        let action = self
            .reactions
            .upsert_or_delete(comment_id, user_id, ty)
            .await?;

        tracing::debug!(
            "Reaction {:?} by user {} on comment {}: {:?}",
            ty,
            user_id,
            comment_id,
            action
        );
        Ok(comment_id)
    }

    /// Ownership gate shared by edit and delete.
    async fn owned_comment(&self, comment_id: i64, user_id: i64) -> Result<Comment, AppError> {
        match self.comments.owned_by(comment_id, user_id).await {
            Ok(true) => {}
            Ok(false) | Err(StoreError::NotFound) => {
                tracing::warn!(
                    "User {} denied access to comment {}",
                    user_id,
                    comment_id
                );
                return Err(AppError::Forbidden(NOT_OWNER.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        self.comments
            .find(comment_id)
            .await?
            .ok_or_else(|| AppError::Forbidden(NOT_OWNER.to_string()))
    }

    /// Joins a page of rows with authors, media, reactions and answer counts,
    /// one batched read per collaborator.
    async fn hydrate(
        &self,
        rows: Vec<Comment>,
        viewer_id: Option<i64>,
    ) -> Result<Vec<CommentView>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|c| c.id).collect();

        let mut author_ids: Vec<i64> = rows.iter().map(|c| c.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut media_ids: Vec<i64> = rows.iter().flat_map(|c| c.media_ids.iter().copied()).collect();
        media_ids.sort_unstable();
        media_ids.dedup();

        let reactions = self.reactions.by_comment_ids(&ids).await?;
        let mut summaries = aggregator::summarize_all(&reactions, viewer_id);
        let children_counts = self.comments.direct_children_counts(&ids).await?;
        let authors = self.users.resolve_users(&author_ids).await?;
        let medias: HashMap<i64, _> = self
            .media
            .resolve_media(&media_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let author = authors.get(&row.author_id).cloned();
                let attached = row
                    .media_ids
                    .iter()
                    .filter_map(|id| medias.get(id).cloned())
                    .collect();
                let id = row.id;

                let mut view = CommentView::from_row(row);
                view.author = author;
                view.medias = attached;
                view.reactions = summaries.remove(&id).unwrap_or_default();
                view.children_count = children_counts.get(&id).copied().unwrap_or(0);
                view
            })
            .collect())
    }
}

fn sanitize(text: &str) -> Result<String, AppError> {
    let cleaned = clean_html(text.trim());
    if cleaned.trim().is_empty() {
        return Err(AppError::BadRequest("Comment text must not be empty".to_string()));
    }
    // Escaping can grow the text past what the raw-input check allowed.
    if cleaned.chars().count() > MAX_TEXT_CHARS {
        return Err(AppError::BadRequest(format!(
            "Comment must be at most {} characters after sanitising",
            MAX_TEXT_CHARS
        )));
    }
    Ok(cleaned)
}
