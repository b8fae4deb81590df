use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{set_version, version_of, Collection, DocumentStore, Filter, StoreError};

type Documents = HashMap<Collection, HashMap<Uuid, Value>>;

/// Process-local document store
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<Documents>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Value>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents.get(&collection).and_then(|docs| docs.get(&id)).cloned())
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(&collection)
            .map(|docs| docs.values().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, collection: Collection, id: Uuid, mut doc: Value) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let docs = documents.entry(collection).or_default();

        if docs.contains_key(&id) {
            return Err(StoreError::Duplicate { collection, key: "id" });
        }
        if let Some(key) = collection.unique_key() {
            let value = doc.get(key).filter(|v| !v.is_null());
            if value.is_some() && docs.values().any(|existing| existing.get(key) == value) {
                return Err(StoreError::Duplicate { collection, key });
            }
        }

        set_version(&mut doc, 0);
        docs.insert(id, doc);
        Ok(())
    }

    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        expected_version: u64,
        mut doc: Value,
    ) -> Result<u64, StoreError> {
        // Check and write under one lock
        let mut documents = self.documents.write().await;
        let current = documents
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(&id))
            .ok_or(StoreError::Missing { collection, id })?;

        if version_of(current) != expected_version {
            return Err(StoreError::Conflict { collection, id });
        }

        let next = expected_version + 1;
        set_version(&mut doc, next);
        *current = doc;
        Ok(next)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError> {
        let mut documents = self.documents.write().await;
        Ok(documents
            .get_mut(&collection)
            .and_then(|docs| docs.remove(&id))
            .is_some())
    }

    async fn delete_where(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        let mut documents = self.documents.write().await;
        let Some(docs) = documents.get_mut(&collection) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|_, doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Memory store whose lookups suspend around the read, as a networked store's would
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct YieldingStore {
    inner: MemoryStore,
}

#[cfg(test)]
#[async_trait]
impl DocumentStore for YieldingStore {
    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Value>, StoreError> {
        tokio::task::yield_now().await;
        let doc = self.inner.get(collection, id).await;
        tokio::task::yield_now().await;
        doc
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        tokio::task::yield_now().await;
        let docs = self.inner.find(collection, filter).await;
        tokio::task::yield_now().await;
        docs
    }

    async fn insert(&self, collection: Collection, id: Uuid, doc: Value) -> Result<(), StoreError> {
        self.inner.insert(collection, id, doc).await
    }

    async fn replace(
        &self,
        collection: Collection,
        id: Uuid,
        expected_version: u64,
        doc: Value,
    ) -> Result<u64, StoreError> {
        self.inner.replace(collection, id, expected_version, doc).await
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, StoreError> {
        self.inner.delete(collection, id).await
    }

    async fn delete_where(&self, collection: Collection, filter: &Filter) -> Result<u64, StoreError> {
        self.inner.delete_where(collection, filter).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}
