use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::{media::Media, reaction::ReactionSummary, user::Author};

/// Represents the 'comments' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub author_id: i64,
    pub product_id: i64,
    #[sqlx(rename = "comment_text")]
    pub text: String,
    /// `None` for root comments.
    pub parent_id: Option<i64>,
    pub rating: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub media_ids: Vec<i64>,
    #[sqlx(rename = "is_deleted")]
    pub deleted: bool,
}

/// Values for a row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub author_id: i64,
    pub product_id: i64,
    pub parent_id: Option<i64>,
    pub text: String,
    pub rating: Option<i16>,
    pub media_ids: Vec<i64>,
}

/// DTO for creating a new comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Comment must be between 1 and 2000 characters"
    ))]
    pub text: String,

    /// Optional: the ID of the comment being answered.
    pub parent_id: Option<i64>,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,

    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 attachments are allowed"))]
    pub media_ids: Vec<i64>,
}

/// DTO for editing the text of an existing comment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditCommentRequest {
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Comment must be between 1 and 2000 characters"
    ))]
    pub text: String,
}

/// A comment joined with its author, attachments and reactions.
/// Built fresh for every request.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub product_id: i64,
    pub parent_id: Option<i64>,
    pub author: Option<Author>,
    pub text: String,
    pub rating: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub medias: Vec<Media>,
    pub reactions: ReactionSummary,
    pub deleted: bool,
    pub children: Vec<CommentView>,
    /// Number of direct answers, regardless of what was loaded.
    pub children_count: u64,
}

impl CommentView {
    /// Wraps a row with empty joins. Deleted rows never carry text.
    pub fn from_row(comment: Comment) -> Self {
        let text = if comment.deleted {
            String::new()
        } else {
            comment.text
        };

        Self {
            id: comment.id,
            product_id: comment.product_id,
            parent_id: comment.parent_id,
            author: None,
            text,
            rating: comment.rating,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            medias: Vec::new(),
            reactions: ReactionSummary::default(),
            deleted: comment.deleted,
            children: Vec::new(),
            children_count: 0,
        }
    }
}

/// One page of comments plus the unpaginated total.
#[derive(Debug, Serialize)]
pub struct CommentsPage {
    pub comments: Vec<CommentView>,
    pub total_count: i64,
}

impl CommentsPage {
    pub fn empty(total_count: i64) -> Self {
        Self {
            comments: Vec::new(),
            total_count,
        }
    }
}

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Normalised limit/offset pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
}

impl PageRequest {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Query parameters for listing root comments.
#[derive(Debug, Deserialize)]
pub struct CommentListParams {
    /// Number of items to return (default: 20, max: 100).
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for listing the answers under a comment.
#[derive(Debug, Deserialize)]
pub struct AnswerListParams {
    pub product_id: i64,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps() {
        assert_eq!(PageRequest::new(None, None), PageRequest { limit: 20, offset: 0 });
        assert_eq!(PageRequest::new(Some(0), Some(-5)), PageRequest { limit: 1, offset: 0 });
        assert_eq!(PageRequest::new(Some(500), Some(40)), PageRequest { limit: 100, offset: 40 });
    }

    #[test]
    fn deleted_row_view_has_no_text() {
        let row = Comment {
            id: 1,
            author_id: 2,
            product_id: 3,
            text: "still here".to_string(),
            parent_id: None,
            rating: None,
            created_at: Utc::now(),
            updated_at: None,
            media_ids: vec![],
            deleted: true,
        };
        let view = CommentView::from_row(row);
        assert!(view.deleted);
        assert_eq!(view.text, "");
    }
}
