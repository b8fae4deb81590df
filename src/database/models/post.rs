use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::Document;
use crate::database::store::Collection;

use super::user::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Author
    pub user: Uuid,
    pub text: String,
    /// Author name at creation time, never refreshed
    pub name: String,
    /// Author avatar at creation time, never refreshed
    pub avatar: String,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub date: DateTime<Utc>,
    #[serde(rename = "__v", default)]
    pub version: u64,
}

impl Post {
    pub fn new(author: &User, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: author.id,
            text,
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            likes: Vec::new(),
            comments: Vec::new(),
            date: Utc::now(),
            version: 0,
        }
    }
}

impl Document for Post {
    const COLLECTION: Collection = Collection::Posts;

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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

impl Comment {
    pub fn new(id: Uuid, author: &User, text: String) -> Self {
        Self {
            id,
            user: author.id,
            text,
            name: author.name.clone(),
            avatar: author.avatar.clone(),
            date: Utc::now(),
        }
    }
}
