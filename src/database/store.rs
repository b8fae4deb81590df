use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::database::manager::DatabaseError;

/// Field holding the optimistic version of every stored document
pub const VERSION_FIELD: &str = "__v";

/// Top-level document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Profiles,
    Posts,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Profiles => "profiles",
            Collection::Posts => "posts",
        }
    }

    /// Body field no two documents of the collection may share
    pub fn unique_key(&self) -> Option<&'static str> {
        match self {
            Collection::Users => Some("email"),
            Collection::Profiles => Some("user"),
            Collection::Posts => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {id} in {collection} was modified concurrently")]
    Conflict { collection: Collection, id: Uuid },

    #[error("a document with the same {key} already exists in {collection}")]
    Duplicate {
        collection: Collection,
        key: &'static str,
    },

    #[error("document {id} is missing from {collection}")]
    Missing { collection: Collection, id: Uuid },

    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(DatabaseError::Sqlx(err))
    }
}

/// Conjunction of top-level equality conditions
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }

    /// JSON object usable as a containment pattern
    pub fn to_pattern(&self) -> Value {
        let map: Map<String, Value> = self.conditions.iter().cloned().collect();
        Value::Object(map)
    }
}

/// Read the stored version of a document, 0 when absent.
pub fn version_of(doc: &Value) -> u64 {
    doc.get(VERSION_FIELD).and_then(Value::as_u64).unwrap_or(0)
}

pub(crate) fn set_version(doc: &mut Value, version: u64) {
    if let Value::Object(map) = doc {
        map.insert(VERSION_FIELD.to_string(), Value::from(version));
    }
}

/// Document store reachable by primary key and simple equality filters.
///
/// `replace` is a compare-and-swap on the version field: it succeeds only
/// if the stored version still equals `expected_version`, and stores the
/// document with the version incremented. Callers never retry on conflict.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Value>, StoreError>;

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    /// Fails with `Duplicate` when the id, or the collection's unique key,
    /// is already taken.
    async fn insert(&self, collection: Collection, id: Uuid, doc: Value) -> Result<(), StoreError>;

    /// Returns the new version on success.
    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        expected_version: u64,
        doc: Value,
    ) -> Result<u64, StoreError>;

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError>;

    async fn delete_where(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_matches_all_conditions() {
        let doc = json!({ "user": "u1", "status": "dev", "skills": ["rust"] });

        assert!(Filter::new().matches(&doc));
        assert!(Filter::new().eq("user", "u1").matches(&doc));
        assert!(Filter::new().eq("user", "u1").eq("status", "dev").matches(&doc));
        assert!(!Filter::new().eq("user", "u1").eq("status", "ops").matches(&doc));
        assert!(!Filter::new().eq("missing", "x").matches(&doc));
    }

    #[test]
    fn pattern_is_flat_object() {
        let pattern = Filter::new().eq("email", "a@x.com").to_pattern();
        assert_eq!(pattern, json!({ "email": "a@x.com" }));
    }

    #[test]
    fn only_posts_have_no_unique_key() {
        assert_eq!(Collection::Users.unique_key(), Some("email"));
        assert_eq!(Collection::Profiles.unique_key(), Some("user"));
        assert_eq!(Collection::Posts.unique_key(), None);
    }

    #[test]
    fn version_defaults_to_zero() {
        let mut doc = json!({});
        assert_eq!(version_of(&doc), 0);
        set_version(&mut doc, 3);
        assert_eq!(version_of(&doc), 3);
    }
}
