use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated identity extracted from the token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id(),
        }
    }
}

/// Verifies the token header and injects `AuthUser` into the request.
/// Runs before any handler, so a rejected request never touches the store.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = state.config.security.auth_header.as_str();
    let token = extract_token(request.headers(), header).ok_or_else(|| {
        tracing::debug!("Request to {} without token", request.uri().path());
        ApiError::unauthorized("No token,auth denied")
    })?;

    let claims = state.tokens.verify(&token).map_err(|_| {
        tracing::debug!("Request to {} with invalid token", request.uri().path());
        ApiError::unauthorized("Token is not valid")
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Raw token from `header`; absent, non-ASCII and blank values count as missing
fn extract_token(headers: &HeaderMap, header: &str) -> Option<String> {
    let value = headers.get(header)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_raw_token() {
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-token", HeaderValue::from_static(" abc.def.ghi "));
        assert_eq!(extract_token(&headers, "x-auth-token").as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn blank_or_absent_header_is_missing() {
        let mut headers = HeaderMap::new();
        assert!(extract_token(&headers, "x-auth-token").is_none());

        headers.insert("x-auth-token", HeaderValue::from_static("  "));
        assert!(extract_token(&headers, "x-auth-token").is_none());
    }
}
