use sha2::{Digest, Sha256};

/// Gravatar URL for an email: 200px, pg-rated, mystery-person fallback.
pub fn gravatar_url(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    let hash = hasher.finalize();

    format!("https://www.gravatar.com/avatar/{:x}?s=200&r=pg&d=mm", hash)
}
