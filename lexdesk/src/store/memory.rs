use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, PoisonError, RwLock},
};

use serde_json::Value;

use super::DocumentStore;
use crate::{errors::StoreError, id::ObjectId, mapping::UpdateMap};

type Collections = HashMap<String, BTreeMap<ObjectId, Value>>;

/// In-process store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, id: ObjectId, document: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let documents = collections.entry(collection.to_string()).or_default();
        if documents.contains_key(&id) {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id: id.to_hex(),
            });
        }
        log::debug!("memory insert {collection}/{id}");
        documents.insert(id, document);
        Ok(())
    }

    async fn find(&self, collection: &str, id: ObjectId) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        Ok(collections.get(collection).and_then(|documents| documents.get(&id)).cloned())
    }

    async fn update(&self, collection: &str, id: ObjectId, fields: &UpdateMap) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let Some(document) = collections.get_mut(collection).and_then(|documents| documents.get_mut(&id)) else {
            return Ok(false);
        };
        let Value::Object(stored) = document else {
            return Err(StoreError::Other {
                message: format!("document {collection}/{id} is not an object").into(),
            });
        };
        log::debug!("memory update {collection}/{id}: {} field(s)", fields.len());
        for (key, value) in fields {
            stored.insert(key.clone(), value.clone());
        }
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: ObjectId) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        Ok(collections
            .get_mut(collection)
            .is_some_and(|documents| documents.remove(&id).is_some()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        Ok(collections
            .get(collection)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default())
    }
}
