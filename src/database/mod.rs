pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
#[cfg(test)]
pub(crate) use memory::YieldingStore;
pub use postgres::PgStore;
pub use repository::{Document, Repository};
pub use store::{Collection, DocumentStore, Filter, StoreError};
