// handlers/public/auth.rs - POST /api/auth handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{LoginRequest, UserService};
use crate::state::AppState;

/// POST /api/auth - exchange email and password for a token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(req) = payload?;
    let token = UserService::new(&state).login(req).await?;
    Ok(ApiResponse::success(json!({ "token": token })))
}
