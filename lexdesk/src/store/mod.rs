//! Document storage seam.
//!
//! Repositories hand full documents to [`DocumentStore::insert`] and sparse
//! [`UpdateMap`]s to [`DocumentStore::update`]; stores never see typed records.

mod configured;
mod memory;
mod redis_json;

pub use configured::{ConfiguredStore, store_from_config};
pub use memory::MemoryStore;
pub use redis_json::RedisStore;

use serde_json::Value;

use crate::{errors::StoreError, id::ObjectId, mapping::UpdateMap};

#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Stores a new document. Fails with [`StoreError::Duplicate`] when `id` is taken.
    async fn insert(&self, collection: &str, id: ObjectId, document: Value) -> Result<(), StoreError>;

    async fn find(&self, collection: &str, id: ObjectId) -> Result<Option<Value>, StoreError>;

    /// Overwrites the top-level keys named in `fields`, leaving every other key
    /// as stored. Returns `false` when no document has `id`.
    async fn update(&self, collection: &str, id: ObjectId, fields: &UpdateMap) -> Result<bool, StoreError>;

    /// Returns `false` when no document has `id`.
    async fn delete(&self, collection: &str, id: ObjectId) -> Result<bool, StoreError>;

    /// Every document in `collection`, ordered by id.
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;
}
