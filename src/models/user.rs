// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Public snapshot of a comment author, joined at read time from the 'users' table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub email: String,

    /// User role: 'user' or 'admin'.
    pub role: String,
}
