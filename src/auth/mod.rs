use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;

pub mod avatar;
pub mod password;

pub use avatar::gravatar_url;
pub use password::{PasswordError, Passwords};

/// Identity reference carried inside the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimUser {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user: ClaimUser,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, lifetime: Duration) -> Result<Self, TokenError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(lifetime)
            .ok_or(TokenError::InvalidLifetime)?;

        Ok(Self {
            user: ClaimUser { id: user_id },
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT secret is not configured")]
    InvalidSecret,

    #[error("JWT lifetime is out of range")]
    InvalidLifetime,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    /// Structural, signature and expiry failures all collapse here.
    #[error("invalid token")]
    InvalidToken,
}

/// Signs and verifies stateless identity claims.
pub trait TokenSigner: Send + Sync {
    fn sign(&self, user_id: Uuid) -> Result<String, TokenError>;

    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 JSON Web Tokens under a shared secret.
pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl JwtSigner {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        let lifetime = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .filter(|lifetime| Utc::now().checked_add_signed(*lifetime).is_some())
            .ok_or(TokenError::InvalidLifetime)?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
            lifetime,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, TokenError> {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }
}

impl TokenSigner for JwtSigner {
    fn sign(&self, user_id: Uuid) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, self.lifetime)?;

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::TokenGeneration(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token verification failed: {}", e);
                TokenError::InvalidToken
            })
    }
}
