use redis::{aio::ConnectionManager, cmd};
use serde_json::Value;

use super::DocumentStore;
use crate::{errors::StoreError, id::ObjectId, keys::KeyContext, mapping::UpdateMap};

const SCAN_COUNT: usize = 512;

/// RedisJSON-backed store: one JSON document per record at
/// `{prefix}:{collection}:{id}`.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::with_connection(conn, prefix))
    }

    pub fn with_connection(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
        }
    }

    pub fn key_context(&self) -> KeyContext<'_> {
        KeyContext::new(&self.prefix)
    }

    fn document_key(&self, collection: &str, id: ObjectId) -> String {
        self.key_context().document(collection, &id.to_hex())
    }

    async fn collection_keys(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let pattern = self.key_context().collection_pattern(collection);
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next_cursor, batch): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }
        Ok(keys)
    }
}

/// JSONPath selecting one top-level member, quoted so any key is safe.
fn member_path(field: &str) -> Result<String, StoreError> {
    Ok(format!("$[{}]", serde_json::to_string(field)?))
}

impl DocumentStore for RedisStore {
    async fn insert(&self, collection: &str, id: ObjectId, document: Value) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let key = self.document_key(collection, id);
        let payload = serde_json::to_string(&document)?;
        log::debug!("JSON.SET {key} NX");
        let written: Option<String> = cmd("JSON.SET")
            .arg(&key)
            .arg("$")
            .arg(payload)
            .arg("NX")
            .query_async(&mut conn)
            .await?;
        if written.is_none() {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id: id.to_hex(),
            });
        }
        Ok(())
    }

    async fn find(&self, collection: &str, id: ObjectId) -> Result<Option<Value>, StoreError> {
        let mut conn = self.conn.clone();
        let key = self.document_key(collection, id);
        let raw: Option<String> = cmd("JSON.GET").arg(&key).query_async(&mut conn).await?;
        raw.map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    async fn update(&self, collection: &str, id: ObjectId, fields: &UpdateMap) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let key = self.document_key(collection, id);
        let exists: i64 = cmd("EXISTS").arg(&key).query_async(&mut conn).await?;
        if exists == 0 {
            return Ok(false);
        }
        if fields.is_empty() {
            return Ok(true);
        }

        let mut pipe = redis::pipe();
        pipe.atomic();
        for (field, value) in fields {
            pipe.cmd("JSON.SET")
                .arg(&key)
                .arg(member_path(field)?)
                .arg(serde_json::to_string(value)?)
                .ignore();
        }
        log::debug!("JSON.SET {key}: {} field(s)", fields.len());
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: ObjectId) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let key = self.document_key(collection, id);
        let deleted: i64 = cmd("DEL").arg(&key).query_async(&mut conn).await?;
        Ok(deleted > 0)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let keys = self.collection_keys(collection).await?;
        let context = self.key_context();
        let mut ids: Vec<ObjectId> = keys
            .iter()
            .filter_map(|key| context.document_id(collection, key))
            .filter_map(|id| ObjectId::parse_str(id).ok())
            .collect();
        ids.sort_unstable();

        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(document) = self.find(collection, id).await? {
                documents.push(document);
            }
        }
        Ok(documents)
    }
}
