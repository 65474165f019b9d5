use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Closed set of reaction kinds, stored as the `reaction_type` Postgres enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "reaction_type", rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Dislike,
    Love,
    Laugh,
    Sad,
    Angry,
}

impl ReactionType {
    pub const ALL: [ReactionType; 6] = [
        ReactionType::Like,
        ReactionType::Dislike,
        ReactionType::Love,
        ReactionType::Laugh,
        ReactionType::Sad,
        ReactionType::Angry,
    ];
}

/// Represents the 'comment_reactions' table. One row per (user, comment).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Reaction {
    pub user_id: i64,
    pub comment_id: i64,
    pub ty: ReactionType,
    pub added_at: DateTime<Utc>,
}

/// Which branch of the toggle was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionAction {
    Created,
    Updated,
    Deleted,
}

/// Per-type counts for one comment plus the viewer's own reaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReactionSummary {
    pub counts: BTreeMap<ReactionType, u64>,
    pub your_reaction: Option<ReactionType>,
}

impl ReactionSummary {
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// DTO for setting (or toggling off) a reaction.
#[derive(Debug, Deserialize)]
pub struct SetReactionRequest {
    #[serde(rename = "type")]
    pub ty: ReactionType,
}
