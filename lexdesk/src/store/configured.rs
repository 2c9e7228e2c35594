use serde_json::Value;

use super::{DocumentStore, MemoryStore, RedisStore};
use crate::{
    config::{AppConfig, StoreBackend},
    errors::StoreError,
    id::ObjectId,
    mapping::UpdateMap,
};

/// The store selected by `[store] backend`.
#[derive(Clone)]
pub enum ConfiguredStore {
    Memory(MemoryStore),
    Redis(RedisStore),
}

impl ConfiguredStore {
    pub fn backend(&self) -> StoreBackend {
        match self {
            ConfiguredStore::Memory(_) => StoreBackend::Memory,
            ConfiguredStore::Redis(_) => StoreBackend::Redis,
        }
    }
}

/// Opens the backend named in `config`. Redis connects eagerly, so a bad URL
/// or unreachable server fails here rather than on first use.
pub async fn store_from_config(config: &AppConfig) -> Result<ConfiguredStore, StoreError> {
    match config.store.backend {
        StoreBackend::Memory => Ok(ConfiguredStore::Memory(MemoryStore::new())),
        StoreBackend::Redis => {
            let url = config.redis_url()?;
            log::info!("connecting to redis store (prefix `{}`)", config.store.prefix);
            let store = RedisStore::connect(&url, config.store.prefix.clone()).await?;
            Ok(ConfiguredStore::Redis(store))
        }
    }
}

impl DocumentStore for ConfiguredStore {
    async fn insert(&self, collection: &str, id: ObjectId, document: Value) -> Result<(), StoreError> {
        match self {
            ConfiguredStore::Memory(store) => store.insert(collection, id, document).await,
            ConfiguredStore::Redis(store) => store.insert(collection, id, document).await,
        }
    }

    async fn find(&self, collection: &str, id: ObjectId) -> Result<Option<Value>, StoreError> {
        match self {
            ConfiguredStore::Memory(store) => store.find(collection, id).await,
            ConfiguredStore::Redis(store) => store.find(collection, id).await,
        }
    }

    async fn update(&self, collection: &str, id: ObjectId, fields: &UpdateMap) -> Result<bool, StoreError> {
        match self {
            ConfiguredStore::Memory(store) => store.update(collection, id, fields).await,
            ConfiguredStore::Redis(store) => store.update(collection, id, fields).await,
        }
    }

    async fn delete(&self, collection: &str, id: ObjectId) -> Result<bool, StoreError> {
        match self {
            ConfiguredStore::Memory(store) => store.delete(collection, id).await,
            ConfiguredStore::Redis(store) => store.delete(collection, id).await,
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        match self {
            ConfiguredStore::Memory(store) => store.list(collection).await,
            ConfiguredStore::Redis(store) => store.list(collection).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;
    use serde_json::json;
    use serial_test::serial;

    #[tokio::test]
    async fn default_config_opens_memory_store() {
        let store = store_from_config(&AppConfig::default()).await.unwrap();
        assert_eq!(store.backend(), StoreBackend::Memory);

        let id = ObjectId::generate();
        store.insert("plans", id, json!({ "name": "Solo" })).await.unwrap();
        assert_eq!(store.find("plans", id).await.unwrap(), Some(json!({ "name": "Solo" })));
        assert_eq!(store.list("plans").await.unwrap().len(), 1);
        assert!(store.delete("plans", id).await.unwrap());
    }

    #[tokio::test]
    #[serial]
    async fn redis_backend_needs_its_url_variable() {
        unsafe {
            std::env::remove_var("LEXDESK_TEST_REDIS_URL");
        }
        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Redis;
        config.store.url = "${LEXDESK_TEST_REDIS_URL}".into();

        let err = store_from_config(&config).await.err().expect("url cannot be resolved");
        assert!(matches!(
            err,
            StoreError::Config(ConfigError::MissingVariable { ref name, .. }) if name == "LEXDESK_TEST_REDIS_URL"
        ));
    }
}
