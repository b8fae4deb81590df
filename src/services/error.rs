use std::fmt;
use thiserror::Error;

use crate::auth::{PasswordError, TokenError};
use crate::database::StoreError;
use crate::services::github::GithubError;
use crate::services::ownership::Operation;
use crate::validation::FieldError;

/// Resources addressable by identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Profile,
    Post,
}

impl ResourceKind {
    /// Message shown to clients when the resource cannot be resolved
    pub fn not_found_message(&self) -> &'static str {
        match self {
            ResourceKind::User => "User not found",
            ResourceKind::Profile => "Profile not found",
            ResourceKind::Post => "Post not found",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::User => f.write_str("user"),
            ResourceKind::Profile => f.write_str("profile"),
            ResourceKind::Post => f.write_str("post"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{kind} not found")]
    NotFound { kind: ResourceKind },

    #[error("malformed {kind} id '{raw}'")]
    MalformedId { kind: ResourceKind, raw: String },

    #[error("not authorized to {0}")]
    Forbidden(Operation),

    #[error("post already liked")]
    AlreadyLiked,

    #[error("post not liked")]
    NotLiked,

    #[error("user has no profile")]
    NoProfile,

    #[error("user already exists")]
    UserExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Store(StoreError),

    #[error("{0}")]
    Conflict(StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Github(#[from] GithubError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            // A concurrent delete is indistinguishable from a concurrent write to the caller
            StoreError::Conflict { .. } | StoreError::Missing { .. } => ServiceError::Conflict(err),
            other => ServiceError::Store(other),
        }
    }
}

impl From<Vec<FieldError>> for ServiceError {
    fn from(errors: Vec<FieldError>) -> Self {
        ServiceError::Validation(errors)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
