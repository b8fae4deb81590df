use async_trait::async_trait;
use serde_json::Value;
use sqlx::Row;
use uuid::Uuid;

use super::manager::DatabaseManager;
use super::store::{set_version, Collection, DocumentStore, Filter, StoreError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id UUID NOT NULL,
        version BIGINT NOT NULL DEFAULT 0,
        body JSONB NOT NULL,
        PRIMARY KEY (collection, id)
    )
"#;

const CREATE_BODY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS documents_body_idx ON documents USING GIN (body jsonb_path_ops)";

const PRIMARY_KEY: &str = "documents_pkey";

const COLLECTIONS: [Collection; 3] = [Collection::Users, Collection::Profiles, Collection::Posts];

fn unique_index_name(collection: Collection, key: &str) -> String {
    format!("documents_{}_{}_key", collection.as_str(), key)
}

/// Partial unique index over one body field of one collection
fn create_unique_index(collection: Collection, key: &str) -> String {
    format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON documents (lower(body->>'{}')) WHERE collection = '{}'",
        unique_index_name(collection, key),
        key,
        collection.as_str()
    )
}

/// Documents kept as JSONB rows in a single Postgres table
#[derive(Clone)]
pub struct PgStore {
    db: DatabaseManager,
}

impl PgStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    /// Create the backing table if it does not exist yet
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(self.db.pool()).await?;
        sqlx::query(CREATE_BODY_INDEX).execute(self.db.pool()).await?;

        for collection in COLLECTIONS {
            if let Some(key) = collection.unique_key() {
                sqlx::query(&create_unique_index(collection, key))
                    .execute(self.db.pool())
                    .await?;
            }
        }
        Ok(())
    }
}

/// Which key a unique violation on insert was raised for, if any
fn violated_key(collection: Collection, err: &sqlx::Error) -> Option<&'static str> {
    let sqlx::Error::Database(db) = err else {
        return None;
    };
    if !db.is_unique_violation() {
        return None;
    }

    match (db.constraint(), collection.unique_key()) {
        (Some(PRIMARY_KEY), _) | (_, None) => Some("id"),
        (_, Some(key)) => Some(key),
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|r| r.get::<Value, _>("body")))
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let rows = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND body @> $2")
            .bind(collection.as_str())
            .bind(filter.to_pattern())
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.into_iter().map(|r| r.get::<Value, _>("body")).collect())
    }

    async fn insert(&self, collection: Collection, id: Uuid, mut doc: Value) -> Result<(), StoreError> {
        set_version(&mut doc, 0);

        let result = sqlx::query(
            "INSERT INTO documents (collection, id, version, body) VALUES ($1, $2, 0, $3)",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(&doc)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => match violated_key(collection, &err) {
                Some(key) => Err(StoreError::Duplicate { collection, key }),
                None => Err(err.into()),
            },
        }
    }

    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        expected_version: u64,
        mut doc: Value,
    ) -> Result<u64, StoreError> {
        let next = expected_version + 1;
        set_version(&mut doc, next);

        let result = sqlx::query(
            "UPDATE documents SET body = $1, version = $2
             WHERE collection = $3 AND id = $4 AND version = $5",
        )
        .bind(&doc)
        .bind(next as i64)
        .bind(collection.as_str())
        .bind(id)
        .bind(expected_version as i64)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 1 {
            return Ok(next);
        }

        // Nothing updated: either the row moved on or it is gone
        match self.get(collection, id).await? {
            Some(_) => Err(StoreError::Conflict { collection, id }),
            None => Err(StoreError::Missing { collection, id }),
        }
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_where(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND body @> $2")
            .bind(collection.as_str())
            .bind(filter.to_pattern())
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.health_check().await?;
        Ok(())
    }
}
