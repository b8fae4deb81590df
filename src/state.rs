use std::sync::Arc;
use thiserror::Error;

use crate::auth::{JwtSigner, PasswordError, Passwords, TokenError, TokenSigner};
use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::services::{GithubClient, GithubError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("token signer: {0}")]
    Token(#[from] TokenError),

    #[error("password hasher: {0}")]
    Password(#[from] PasswordError),

    #[error("github client: {0}")]
    Github(#[from] GithubError),
}

/// Shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<dyn TokenSigner>,
    pub passwords: Passwords,
    pub github: GithubClient,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self, StartupError> {
        let tokens = JwtSigner::from_config(&config.security)?;
        let passwords = Passwords::from_config(&config.security)?;
        let github = GithubClient::new(config.github.clone())?;

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens: Arc::new(tokens),
            passwords,
            github,
        })
    }
}
