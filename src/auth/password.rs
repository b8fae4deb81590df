use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::SecurityConfig;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Argon2id hashing. Work happens on the blocking pool so request tasks
/// are never stalled by it.
#[derive(Clone)]
pub struct Passwords {
    argon: Argon2<'static>,
}

impl Passwords {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;

        Ok(Self {
            argon: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, PasswordError> {
        Self::new(security.password_memory_kib, security.password_iterations)
    }

    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let argon = self.argon.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| PasswordError::Hash(e.to_string()))
        })
        .await?
    }

    /// Returns false for a mismatch or an unparseable stored hash.
    pub async fn verify(&self, password: &str, stored: &str) -> Result<bool, PasswordError> {
        let argon = self.argon.clone();
        let password = password.to_owned();
        let stored = stored.to_owned();

        let matched = tokio::task::spawn_blocking(move || match PasswordHash::new(&stored) {
            Ok(parsed) => argon.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                tracing::warn!("Stored password hash is unreadable: {}", e);
                false
            }
        })
        .await?;

        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_verifies_only_the_original_password() {
        let passwords = Passwords::new(8, 1).unwrap();
        let hash = passwords.hash("secret1").await.unwrap();

        assert_ne!(hash, "secret1");
        assert!(passwords.verify("secret1", &hash).await.unwrap());
        assert!(!passwords.verify("secret2", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_hash_does_not_verify() {
        let passwords = Passwords::new(8, 1).unwrap();
        assert!(!passwords.verify("secret1", "plaintext").await.unwrap());
    }
}
