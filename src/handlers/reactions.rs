use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::reaction::SetReactionRequest,
    services::CommentService,
    utils::jwt::Claims,
};

/// Add, change or remove the caller's reaction on a comment.
/// Sending the current type again removes it.
pub async fn set_reaction(
    State(service): State<Arc<CommentService>>,
    Extension(claims): Extension<Claims>,
    Path(comment_id): Path<i64>,
    Json(payload): Json<SetReactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let id = service.set_reaction(comment_id, user_id, payload.ty).await?;

    Ok(Json(serde_json::json!({ "id": id })))
}
