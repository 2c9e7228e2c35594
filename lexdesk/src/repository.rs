//! Typed access to one collection of a [`DocumentStore`].

use std::marker::PhantomData;

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{errors::StoreError, id::ObjectId, mapping::UpdateMap, store::DocumentStore};

/// A record stored as one document.
pub trait Entity: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;

    /// Timestamp field stamped with the current time on every update, unless
    /// the update map already sets it.
    const TOUCH_FIELD: Option<&'static str> = Some("updatedAt");

    /// Fields fixed at creation; update maps naming them are rejected.
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["id", "createdAt"];

    fn id(&self) -> ObjectId;
}

/// `document` with the top-level keys of `fields` overwritten, decoded as `E`.
fn merged<E>(document: Value, fields: &UpdateMap) -> Result<E, StoreError>
where
    E: DeserializeOwned,
{
    let Value::Object(mut members) = document else {
        return Err(StoreError::Other {
            message: "stored document is not an object".into(),
        });
    };
    for (key, value) in fields {
        members.insert(key.clone(), value.clone());
    }
    Ok(serde_json::from_value(Value::Object(members))?)
}

pub struct Repo<S, E> {
    store: S,
    _marker: PhantomData<fn() -> E>,
}

impl<S, E> Repo<S, E>
where
    S: DocumentStore,
    E: Entity,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn create(&self, record: &E) -> Result<(), StoreError> {
        let document = serde_json::to_value(record)?;
        self.store.insert(E::COLLECTION, record.id(), document).await
    }

    pub async fn get(&self, id: ObjectId) -> Result<Option<E>, StoreError> {
        match self.store.find(E::COLLECTION, id).await? {
            Some(document) => Ok(Some(serde_json::from_value(document)?)),
            None => Ok(None),
        }
    }

    /// Applies a sparse update and returns the refreshed record, or `None`
    /// when no record has `id`.
    ///
    /// The update is merged into the stored document and decoded as `E`
    /// before anything is written; a map that would leave the document
    /// unreadable fails with [`StoreError::Serialization`] and the stored
    /// document is unchanged.
    pub async fn update(&self, id: ObjectId, mut fields: UpdateMap) -> Result<Option<E>, StoreError> {
        if let Some(field) = E::IMMUTABLE_FIELDS.iter().find(|field| fields.contains_key(**field)) {
            return Err(StoreError::ImmutableField {
                field: (*field).to_string(),
            });
        }

        if let Some(touch) = E::TOUCH_FIELD
            && !fields.contains_key(touch)
        {
            fields.insert(touch.to_string(), serde_json::to_value(Utc::now())?);
        }

        let Some(current) = self.store.find(E::COLLECTION, id).await? else {
            return Ok(None);
        };
        let updated = merged::<E>(current, &fields)?;

        if !self.store.update(E::COLLECTION, id, &fields).await? {
            return Ok(None);
        }
        Ok(Some(updated))
    }

    pub async fn delete(&self, id: ObjectId) -> Result<bool, StoreError> {
        self.store.delete(E::COLLECTION, id).await
    }

    /// Every record in the collection, ordered by id.
    pub async fn list(&self) -> Result<Vec<E>, StoreError> {
        self.store
            .list(E::COLLECTION)
            .await?
            .into_iter()
            .map(|document: Value| serde_json::from_value(document).map_err(StoreError::from))
            .collect()
    }
}
