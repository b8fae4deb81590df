// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::services::{GithubError, ServiceError};
use crate::validation::FieldError;

/// HTTP API error with status code and client-facing body
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError { errors: Vec<FieldError> },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // Ownership failures keep the 400 clients already handle
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (GitHub unreachable)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { errors } => errors
                .first()
                .map(|e| e.msg.as_str())
                .unwrap_or("Invalid request"),
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// `{"errors": [...]}` for validation failures, `{"msg": "..."}` otherwise
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { errors } => json!({ "errors": errors }),
            _ => json!({ "msg": self.message() }),
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(errors: Vec<FieldError>) -> Self {
        ApiError::ValidationError { errors }
    }

    /// Validation failure with a single message and no field
    pub fn general(message: impl Into<String>) -> Self {
        ApiError::ValidationError {
            errors: vec![FieldError::general(message)],
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { kind } => {
                tracing::debug!("{} not found", kind);
                ApiError::not_found(kind.not_found_message())
            }
            ServiceError::MalformedId { kind, raw } => {
                tracing::warn!("Malformed {} id '{}'", kind, raw);
                ApiError::not_found(kind.not_found_message())
            }
            ServiceError::Forbidden(_) => ApiError::forbidden("User not authorized"),
            ServiceError::AlreadyLiked => ApiError::bad_request("Post already liked"),
            ServiceError::NotLiked => ApiError::bad_request("Post not liked"),
            ServiceError::NoProfile => ApiError::bad_request("There is no profile for this user"),
            ServiceError::UserExists => ApiError::general("User already exists"),
            ServiceError::InvalidCredentials => ApiError::general("Invalid credentials"),
            ServiceError::Validation(errors) => ApiError::validation_error(errors),
            ServiceError::Conflict(err) => {
                tracing::warn!("Concurrent write rejected: {}", err);
                ApiError::conflict("Resource was modified concurrently, please retry")
            }
            ServiceError::Store(err) => {
                tracing::error!("Store failure: {}", err);
                ApiError::internal_server_error("Server error")
            }
            ServiceError::Token(err) => {
                tracing::error!("Token signing failed: {}", err);
                ApiError::internal_server_error("Server error")
            }
            ServiceError::Password(err) => {
                tracing::error!("Password hashing failed: {}", err);
                ApiError::internal_server_error("Server error")
            }
            ServiceError::Github(err) => err.into(),
        }
    }
}

impl From<GithubError> for ApiError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::NoAccount(_) => ApiError::not_found("No github account for this username"),
            GithubError::InvalidBase(base) => {
                tracing::error!("GitHub API base is unusable: {}", base);
                ApiError::internal_server_error("Server error")
            }
            GithubError::Http(err) => {
                tracing::error!("GitHub request failed: {}", err);
                ApiError::bad_gateway("GitHub is unavailable")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        ApiError::invalid_json(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
