use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{Comment, Like, Post, User};
use crate::database::{Filter, Repository};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::Validator;

use super::error::{ServiceError, ServiceResult};
use super::mutation::{self, MembershipError};
use super::ownership::{authorize, Operation};
use super::resolver::Resolver;

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: Option<String>,
}

/// Posts and their likes and comments
pub struct PostService {
    resolver: Resolver,
    posts: Repository<Post>,
}

impl PostService {
    pub fn new(state: &AppState) -> Self {
        let resolver = Resolver::new(Arc::clone(&state.store));
        Self {
            posts: resolver.repository(),
            resolver,
        }
    }

    pub async fn create(&self, identity: &AuthUser, req: TextRequest) -> ServiceResult<Post> {
        Validator::new()
            .required("text", req.text.as_deref(), "Text is required")
            .finish()?;

        let author: User = self.resolver.resolve_id(identity.id).await?;
        let mut post = Post::new(&author, req.text.unwrap_or_default());
        self.posts.insert(&mut post).await?;

        tracing::debug!("User {} created post {}", identity.id, post.id);
        Ok(post)
    }

    /// Every post, newest first
    pub async fn list(&self) -> ServiceResult<Vec<Post>> {
        let mut posts = self.posts.select_any(&Filter::new()).await?;
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    pub async fn get(&self, raw_id: &str) -> ServiceResult<Post> {
        self.resolver.resolve(raw_id).await
    }

    pub async fn delete(&self, identity: &AuthUser, raw_id: &str) -> ServiceResult<()> {
        let post: Post = self.resolver.resolve(raw_id).await?;
        authorize(Operation::DeletePost, &post, identity)?;

        self.posts.delete(post.id).await?;
        tracing::debug!("User {} deleted post {}", identity.id, post.id);
        Ok(())
    }

    pub async fn like(&self, identity: &AuthUser, raw_id: &str) -> ServiceResult<Vec<Like>> {
        let mut post: Post = self.resolver.resolve(raw_id).await?;
        authorize(Operation::LikePost, &post, identity)?;

        mutation::insert_member(&mut post.likes, Like { user: identity.id }).map_err(like_error)?;
        self.posts.save(&mut post).await?;

        Ok(post.likes)
    }

    pub async fn unlike(&self, identity: &AuthUser, raw_id: &str) -> ServiceResult<Vec<Like>> {
        let mut post: Post = self.resolver.resolve(raw_id).await?;
        authorize(Operation::UnlikePost, &post, identity)?;

        mutation::remove_member(&mut post.likes, identity.id).map_err(like_error)?;
        self.posts.save(&mut post).await?;

        Ok(post.likes)
    }

    pub async fn comment(
        &self,
        identity: &AuthUser,
        raw_id: &str,
        req: TextRequest,
    ) -> ServiceResult<Vec<Comment>> {
        Validator::new()
            .required("text", req.text.as_deref(), "Text is required")
            .finish()?;

        let mut post: Post = self.resolver.resolve(raw_id).await?;
        authorize(Operation::CommentOnPost, &post, identity)?;
        let author: User = self.resolver.resolve_id(identity.id).await?;

        let text = req.text.unwrap_or_default();
        mutation::append(&mut post.comments, |id| Comment::new(id, &author, text));
        self.posts.save(&mut post).await?;

        Ok(post.comments)
    }

    /// Gated on the post's owner. An unknown comment id removes nothing
    /// and still succeeds.
    pub async fn delete_comment(
        &self,
        identity: &AuthUser,
        raw_id: &str,
        raw_comment_id: &str,
    ) -> ServiceResult<Vec<Comment>> {
        let mut post: Post = self.resolver.resolve(raw_id).await?;
        authorize(Operation::DeleteComment, &post, identity)?;

        let removed = Uuid::parse_str(raw_comment_id)
            .map(|comment_id| mutation::remove_by_id(&mut post.comments, comment_id))
            .unwrap_or(false);
        if !removed {
            tracing::debug!("No comment '{}' on post {}", raw_comment_id, post.id);
        }
        self.posts.save(&mut post).await?;

        Ok(post.comments)
    }
}

fn like_error(err: MembershipError) -> ServiceError {
    match err {
        MembershipError::AlreadyMember => ServiceError::AlreadyLiked,
        MembershipError::NotMember => ServiceError::NotLiked,
    }
}
