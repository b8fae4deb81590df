use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::Document;
use crate::database::store::Collection;

/// Registered identity. Only the password hash ever changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string
    pub password: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "__v", default)]
    pub version: u64,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, avatar: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password: password_hash,
            avatar,
            date: Utc::now(),
            version: 0,
        }
    }
}

impl Document for User {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// User as returned to clients, without the password hash
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            date: user.date,
        }
    }
}

/// Name and avatar joined onto profiles for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            avatar: user.avatar.clone(),
        }
    }
}
