use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use super::store::{Collection, DocumentStore, Filter, StoreError};

/// A model persisted as one document of a collection
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    fn id(&self) -> Uuid;

    fn version(&self) -> u64;

    fn set_version(&mut self, version: u64);
}

pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _phantom: PhantomData,
        }
    }
}

impl<T: Document> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn select_id(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn select_one(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        Ok(self.select_any(filter).await?.into_iter().next())
    }

    pub async fn select_any(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        self.store
            .find(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
            .collect()
    }

    pub async fn insert(&self, record: &mut T) -> Result<(), StoreError> {
        let doc = serde_json::to_value(&*record)?;
        self.store.insert(T::COLLECTION, record.id(), doc).await?;
        record.set_version(0);
        Ok(())
    }

    /// Persist `record` over the version it was read at.
    pub async fn save(&self, record: &mut T) -> Result<(), StoreError> {
        let doc = serde_json::to_value(&*record)?;
        let next = self
            .store
            .replace(T::COLLECTION, record.id(), record.version(), doc)
            .await?;
        record.set_version(next);
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.store.delete(T::COLLECTION, id).await
    }

    pub async fn delete_any(&self, filter: &Filter) -> Result<u64, StoreError> {
        self.store.delete_where(T::COLLECTION, filter).await
    }
}
