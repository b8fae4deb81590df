// handlers/protected/auth.rs - GET /api/auth handler

use axum::{extract::State, Extension};

use crate::database::models::PublicUser;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UserService;
use crate::state::AppState;

/// GET /api/auth - the authenticated user, without the password hash
pub async fn current_user(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
) -> ApiResult<PublicUser> {
    let user = UserService::new(&state).current(&identity).await?;
    Ok(ApiResponse::success(user))
}
