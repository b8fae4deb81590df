// handlers/public/users.rs - POST /api/users handler

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{RegisterRequest, UserService};
use crate::state::AppState;

/// POST /api/users - register and receive a token
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(req) = payload?;
    let token = UserService::new(&state).register(req).await?;
    Ok(ApiResponse::success(json!({ "token": token })))
}
