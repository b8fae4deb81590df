// handlers/protected/posts.rs - /api/posts handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::database::models::{Comment, Like, Post};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{PostService, TextRequest};
use crate::state::AppState;

/// POST /api/posts
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<Post> {
    let Json(req) = payload?;
    let post = PostService::new(&state).create(&identity, req).await?;
    Ok(ApiResponse::success(post))
}

/// GET /api/posts - newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Post>> {
    let posts = PostService::new(&state).list().await?;
    Ok(ApiResponse::success(posts))
}

/// GET /api/posts/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Post> {
    let post = PostService::new(&state).get(&id).await?;
    Ok(ApiResponse::success(post))
}

/// DELETE /api/posts/:id - owner only
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    PostService::new(&state).delete(&identity, &id).await?;
    Ok(ApiResponse::message("Post removed"))
}

/// PUT /api/posts/like/:id
pub async fn like(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Like>> {
    let likes = PostService::new(&state).like(&identity, &id).await?;
    Ok(ApiResponse::success(likes))
}

/// PUT /api/posts/unlike/:id
pub async fn unlike(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Like>> {
    let likes = PostService::new(&state).unlike(&identity, &id).await?;
    Ok(ApiResponse::success(likes))
}

/// PUT /api/posts/comment/:id
pub async fn comment(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<Vec<Comment>> {
    let Json(req) = payload?;
    let comments = PostService::new(&state).comment(&identity, &id, req).await?;
    Ok(ApiResponse::success(comments))
}

/// DELETE /api/posts/comment/:id/:comment_id - post owner only
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path((id, comment_id)): Path<(String, String)>,
) -> ApiResult<Vec<Comment>> {
    let comments = PostService::new(&state)
        .delete_comment(&identity, &id, &comment_id)
        .await?;
    Ok(ApiResponse::success(comments))
}
