use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{Post, Profile, User};
use crate::database::{Document, DocumentStore, Filter, Repository};

use super::error::{ResourceKind, ServiceError};

/// Documents the resolver can load by id
pub trait Resolvable: Document {
    const KIND: ResourceKind;
}

impl Resolvable for User {
    const KIND: ResourceKind = ResourceKind::User;
}

impl Resolvable for Profile {
    const KIND: ResourceKind = ResourceKind::Profile;
}

impl Resolvable for Post {
    const KIND: ResourceKind = ResourceKind::Post;
}

/// Parse a client-supplied identifier for `kind`.
pub fn parse_id(kind: ResourceKind, raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::MalformedId {
        kind,
        raw: raw.to_string(),
    })
}

/// Loads resources and classifies lookup failures
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn DocumentStore>,
}

impl Resolver {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn repository<T: Document>(&self) -> Repository<T> {
        Repository::new(Arc::clone(&self.store))
    }

    /// Resolve a raw path identifier
    pub async fn resolve<T: Resolvable>(&self, raw_id: &str) -> Result<T, ServiceError> {
        let id = parse_id(T::KIND, raw_id)?;
        self.resolve_id(id).await
    }

    pub async fn resolve_id<T: Resolvable>(&self, id: Uuid) -> Result<T, ServiceError> {
        self.repository::<T>()
            .select_id(id)
            .await?
            .ok_or(ServiceError::NotFound { kind: T::KIND })
    }

    /// The profile owned by `user_id`, if any
    pub async fn profile_of(&self, user_id: Uuid) -> Result<Option<Profile>, ServiceError> {
        let filter = Filter::new().eq("user", user_id.to_string());
        Ok(self.repository::<Profile>().select_one(&filter).await?)
    }
}
