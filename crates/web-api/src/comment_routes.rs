use application::CommentDto;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    auth::{optional_auth, require_auth, AuthUser, MaybeAuthUser},
    error::ApiError,
    extract::ValidatedJson,
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentPayload {
    #[validate(nested)]
    pub comment: NewCommentPayload,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewCommentPayload {
    #[validate(length(min = 1, message = "can't be blank"))]
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment: CommentDto,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<CommentDto>,
}

pub fn comment_routes(state: &AppState) -> Router<AppState> {
    let required = middleware::from_fn_with_state(state.clone(), require_auth);
    let optional = middleware::from_fn_with_state(state.clone(), optional_auth);

    Router::new()
        .route(
            "/articles/{slug}/comments",
            get(list_comments).route_layer(optional),
        )
        .route(
            "/articles/{slug}/comments",
            post(add_comment).route_layer(required.clone()),
        )
        .route(
            "/articles/{slug}/comments/{id}",
            delete(delete_comment).route_layer(required),
        )
}

async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(slug): Path<String>,
    ValidatedJson(payload): ValidatedJson<AddCommentPayload>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let comment = state
        .comment_service
        .add(user_id, &slug, payload.comment.body)
        .await?;

    Ok((StatusCode::CREATED, Json(CommentResponse { comment })))
}

async fn list_comments(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(slug): Path<String>,
) -> Result<Json<CommentsResponse>, ApiError> {
    let comments = state.comment_service.list(viewer, &slug).await?;
    Ok(Json(CommentsResponse { comments }))
}

async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((slug, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    // 非数字 id 不可能对应任何评论
    let comment_id = id
        .parse::<i64>()
        .map_err(|_| ApiError::not_found("comment"))?;

    state
        .comment_service
        .delete(user_id, &slug, comment_id)
        .await?;
    Ok(StatusCode::OK)
}
