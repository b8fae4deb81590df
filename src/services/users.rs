use serde::Deserialize;
use std::sync::Arc;

use crate::auth::{gravatar_url, Passwords, TokenSigner};
use crate::database::models::{Post, Profile, PublicUser, User};
use crate::database::{Filter, Repository, StoreError};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::Validator;

use super::error::{ServiceError, ServiceResult};
use super::resolver::Resolver;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration, login and account removal
pub struct UserService {
    resolver: Resolver,
    users: Repository<User>,
    tokens: Arc<dyn TokenSigner>,
    passwords: Passwords,
}

impl UserService {
    pub fn new(state: &AppState) -> Self {
        let resolver = Resolver::new(Arc::clone(&state.store));
        Self {
            users: resolver.repository(),
            resolver,
            tokens: Arc::clone(&state.tokens),
            passwords: state.passwords.clone(),
        }
    }

    /// Create an account and return a signed token for it
    pub async fn register(&self, req: RegisterRequest) -> ServiceResult<String> {
        Validator::new()
            .required("name", req.name.as_deref(), "Name is required")
            .email("email", req.email.as_deref(), "Please include a valid email")
            .min_len(
                "password",
                req.password.as_deref(),
                6,
                "Please enter a password with 6 or more characters",
            )
            .finish()?;

        let name = req.name.unwrap_or_default().trim().to_string();
        let email = normalize_email(req.email.as_deref().unwrap_or_default());
        let password = req.password.unwrap_or_default();

        if self.find_by_email(&email).await?.is_some() {
            tracing::debug!("Registration refused, email already taken");
            return Err(ServiceError::UserExists);
        }

        let avatar = gravatar_url(&email);
        let hash = self.passwords.hash(&password).await?;
        let mut user = User::new(name, email, hash, avatar);
        match self.users.insert(&mut user).await {
            Ok(()) => {}
            Err(StoreError::Duplicate { .. }) => {
                tracing::debug!("Registration lost a race for the same email");
                return Err(ServiceError::UserExists);
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!("Registered user {}", user.id);
        Ok(self.tokens.sign(user.id)?)
    }

    pub async fn login(&self, req: LoginRequest) -> ServiceResult<String> {
        Validator::new()
            .email("email", req.email.as_deref(), "Please include a valid email")
            .required("password", req.password.as_deref(), "Password is required")
            .finish()?;

        let email = normalize_email(req.email.as_deref().unwrap_or_default());
        let password = req.password.unwrap_or_default();

        let Some(user) = self.find_by_email(&email).await? else {
            return Err(ServiceError::InvalidCredentials);
        };
        if !self.passwords.verify(&password, &user.password).await? {
            tracing::debug!("Wrong password for user {}", user.id);
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(self.tokens.sign(user.id)?)
    }

    pub async fn current(&self, identity: &AuthUser) -> ServiceResult<PublicUser> {
        let user: User = self.resolver.resolve_id(identity.id).await?;
        Ok(user.into())
    }

    /// Remove the caller's profile, posts and account
    pub async fn delete_account(&self, identity: &AuthUser) -> ServiceResult<()> {
        let owned = Filter::new().eq("user", identity.id.to_string());

        let profiles = self.resolver.repository::<Profile>().delete_any(&owned).await?;
        let posts = self.resolver.repository::<Post>().delete_any(&owned).await?;
        self.users.delete(identity.id).await?;

        tracing::info!(
            "Deleted user {} ({} profile, {} posts)",
            identity.id,
            profiles,
            posts
        );
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        Ok(self.users.select_one(&Filter::new().eq("email", email)).await?)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
