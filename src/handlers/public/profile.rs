// handlers/public/profile.rs - public profile reads and the GitHub proxy

use axum::extract::{Path, State};
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ProfileService;
use crate::state::AppState;

/// GET /api/profile
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Value>> {
    let profiles = ProfileService::new(&state).list().await?;
    Ok(ApiResponse::success(profiles))
}

/// GET /api/profile/user/:user_id
pub async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Value> {
    let profile = ProfileService::new(&state).by_user(&user_id).await?;
    Ok(ApiResponse::success(profile))
}

/// GET /api/profile/github/:username - latest repositories, forwarded as-is
pub async fn github_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Value> {
    let repos = state.github.latest_repos(&username).await?;
    Ok(ApiResponse::success(repos))
}
