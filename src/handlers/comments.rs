use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::comment::{
        AnswerListParams, CommentListParams, CreateCommentRequest, EditCommentRequest, PageRequest,
    },
    services::CommentService,
    utils::jwt::{Claims, Viewer},
};

/// List root comments of a product (Recent first).
/// Login optional: a valid token fills in `your_reaction`.
pub async fn list_root_comments(
    State(service): State<Arc<CommentService>>,
    Extension(Viewer(viewer_id)): Extension<Viewer>,
    Path(product_id): Path<i64>,
    Query(params): Query<CommentListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.limit, params.offset);
    let comments = service.list_roots(product_id, viewer_id, page).await?;

    Ok(Json(comments))
}

/// List the nested answers under a comment.
pub async fn list_answers(
    State(service): State<Arc<CommentService>>,
    Extension(Viewer(viewer_id)): Extension<Viewer>,
    Path(comment_id): Path<i64>,
    Query(params): Query<AnswerListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::new(params.limit, params.offset);
    let answers = service
        .list_answers(params.product_id, viewer_id, comment_id, page)
        .await?;

    Ok(Json(answers))
}

/// Create a new comment or answer.
/// Requires: Login.
pub async fn create_comment(
    State(service): State<Arc<CommentService>>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let id = service.add_comment(user_id, product_id, payload).await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Edit the text of a comment.
/// Requires: Login + Author.
pub async fn edit_comment(
    State(service): State<Arc<CommentService>>,
    Extension(claims): Extension<Claims>,
    Path(comment_id): Path<i64>,
    Json(payload): Json<EditCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let id = service.edit_comment(comment_id, user_id, payload).await?;

    Ok(Json(serde_json::json!({ "id": id })))
}

/// Delete a comment (Soft Delete).
/// Requires: Login + Author.
pub async fn delete_comment(
    State(service): State<Arc<CommentService>>,
    Extension(claims): Extension<Claims>,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let id = service.delete_comment(comment_id, user_id).await?;

    Ok(Json(serde_json::json!({ "id": id })))
}
