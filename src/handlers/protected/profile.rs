// handlers/protected/profile.rs - the caller's own profile

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::database::models::Profile;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{
    EducationRequest, ExperienceRequest, ProfileRequest, ProfileService, UserService,
};
use crate::state::AppState;

/// GET /api/profile/me
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
) -> ApiResult<Value> {
    let profile = ProfileService::new(&state).me(&identity).await?;
    Ok(ApiResponse::success(profile))
}

/// POST /api/profile - create or update
pub async fn upsert(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> ApiResult<Profile> {
    let Json(req) = payload?;
    let profile = ProfileService::new(&state).upsert(&identity, req).await?;
    Ok(ApiResponse::success(profile))
}

/// DELETE /api/profile - profile, posts and account
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
) -> ApiResult<Value> {
    UserService::new(&state).delete_account(&identity).await?;
    Ok(ApiResponse::message("User deleted"))
}

/// PUT /api/profile/experience
pub async fn add_experience(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    payload: Result<Json<ExperienceRequest>, JsonRejection>,
) -> ApiResult<Profile> {
    let Json(req) = payload?;
    let profile = ProfileService::new(&state).add_experience(&identity, req).await?;
    Ok(ApiResponse::success(profile))
}

/// DELETE|PUT /api/profile/experience/:exp_id
pub async fn remove_experience(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(exp_id): Path<String>,
) -> ApiResult<Profile> {
    let profile = ProfileService::new(&state)
        .remove_experience(&identity, &exp_id)
        .await?;
    Ok(ApiResponse::success(profile))
}

/// PUT /api/profile/education
pub async fn add_education(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    payload: Result<Json<EducationRequest>, JsonRejection>,
) -> ApiResult<Profile> {
    let Json(req) = payload?;
    let profile = ProfileService::new(&state).add_education(&identity, req).await?;
    Ok(ApiResponse::success(profile))
}

/// DELETE|PUT /api/profile/education/:edu_id
pub async fn remove_education(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthUser>,
    Path(edu_id): Path<String>,
) -> ApiResult<Profile> {
    let profile = ProfileService::new(&state)
        .remove_education(&identity, &edu_id)
        .await?;
    Ok(ApiResponse::success(profile))
}
