use std::fmt;
use uuid::Uuid;

use crate::database::models::{Post, Profile};
use crate::middleware::AuthUser;

use super::error::ServiceError;

/// Every mutation the API performs on an owned resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    DeletePost,
    LikePost,
    UnlikePost,
    CommentOnPost,
    DeleteComment,
    EditProfile,
    AddExperience,
    RemoveExperience,
    AddEducation,
    RemoveEducation,
}

/// Who may perform an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Any authenticated identity
    Open,
    /// Only the identity in the resource's owner field
    Owner,
}

impl Operation {
    pub const fn gate(self) -> Gate {
        match self {
            Operation::LikePost | Operation::UnlikePost | Operation::CommentOnPost => Gate::Open,
            // Comment deletion is gated on the post owner, not the comment author
            Operation::DeletePost
            | Operation::DeleteComment
            | Operation::EditProfile
            | Operation::AddExperience
            | Operation::RemoveExperience
            | Operation::AddEducation
            | Operation::RemoveEducation => Gate::Owner,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::DeletePost => "delete post",
            Operation::LikePost => "like post",
            Operation::UnlikePost => "unlike post",
            Operation::CommentOnPost => "comment on post",
            Operation::DeleteComment => "delete comment",
            Operation::EditProfile => "edit profile",
            Operation::AddExperience => "add experience",
            Operation::RemoveExperience => "remove experience",
            Operation::AddEducation => "add education",
            Operation::RemoveEducation => "remove education",
        };
        f.write_str(name)
    }
}

/// Resources with a single owning identity
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Post {
    fn owner_id(&self) -> Uuid {
        self.user
    }
}

impl Owned for Profile {
    fn owner_id(&self) -> Uuid {
        self.user
    }
}

pub fn check_owner<R: Owned>(resource: &R, identity: &AuthUser) -> bool {
    resource.owner_id() == identity.id
}

/// Apply the operation's gate to `resource` for `identity`.
pub fn authorize<R: Owned>(
    operation: Operation,
    resource: &R,
    identity: &AuthUser,
) -> Result<(), ServiceError> {
    match operation.gate() {
        Gate::Open => Ok(()),
        Gate::Owner if check_owner(resource, identity) => Ok(()),
        Gate::Owner => {
            tracing::warn!(
                "User {} denied '{}' on resource owned by {}",
                identity.id,
                operation,
                resource.owner_id()
            );
            Err(ServiceError::Forbidden(operation))
        }
    }
}
