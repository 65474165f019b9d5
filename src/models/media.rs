use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "media_type")]
pub enum MediaType {
    Image,
    Video,
}

/// Represents the 'medias' table, owned by the product subsystem.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub product_id: Option<i64>,
}
