//! Conversion between wire DTOs and domain records.
//!
//! Every DTO field is a [`Nullable`]. Response DTOs are built with every field
//! present. Create requests are checked for required fields and the rest fall
//! back to per-entity defaults. Update requests are flattened into a sparse
//! [`UpdateMap`] holding only the fields the client sent.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{errors::MappingError, id::ObjectId, nullable::Nullable};

/// Sparse field-name to value map handed to a partial write.
pub type UpdateMap = Map<String, Value>;

/// Update requests that can be flattened into an [`UpdateMap`].
/// Implemented by `#[derive(UpdateFields)]`.
pub trait UpdateFields {
    fn update_fields_to_map(&self) -> Result<UpdateMap, MappingError>;
}

/// Inserts `field` under `key` when it is present. Absent fields are skipped.
pub fn put_present<T>(map: &mut UpdateMap, key: &str, field: &Nullable<T>) -> Result<(), MappingError>
where
    T: Serialize,
{
    if let Some(value) = field.get() {
        let encoded = serde_json::to_value(value).map_err(|source| MappingError::Encode {
            field: key.to_string(),
            source,
        })?;
        map.insert(key.to_string(), encoded);
    }
    Ok(())
}

/// Unwraps a required field or reports it missing.
pub fn require<T>(entity: &'static str, field: &'static str, value: Nullable<T>) -> Result<T, MappingError> {
    value
        .into_option()
        .ok_or(MappingError::MissingRequiredField { entity, field })
}

/// Like [`require`], and also rejects the nil identifier.
pub fn require_id(entity: &'static str, field: &'static str, value: Nullable<ObjectId>) -> Result<ObjectId, MappingError> {
    let id = require(entity, field, value)?;
    if id.is_nil() {
        return Err(MappingError::InvalidField {
            entity,
            field,
            message: "must not be the nil identifier".to_string(),
        });
    }
    Ok(id)
}

/// Per-entity translation between a domain record and its DTOs.
pub trait DomainMapping: Sized {
    /// Entity name used in errors, e.g. `"case"`.
    const ENTITY: &'static str;

    type Dto;
    type Create;
    type Update: UpdateFields;

    /// Wraps every field as present.
    fn to_dto(&self) -> Self::Dto;

    /// Builds a new record, checking required fields in declaration order.
    fn from_create(request: Self::Create) -> Result<Self, MappingError>;
}

/// `None` in, `None` out.
pub fn to_dto<R>(record: Option<&R>) -> Option<R::Dto>
where
    R: DomainMapping,
{
    record.map(R::to_dto)
}

pub fn to_domain<R>(request: R::Create) -> Result<R, MappingError>
where
    R: DomainMapping,
{
    R::from_create(request)
}

/// Element-wise [`DomainMapping::to_dto`], order preserved.
pub fn records_to_dto<R>(records: &[R]) -> Vec<R::Dto>
where
    R: DomainMapping,
{
    records.iter().map(R::to_dto).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn put_present_skips_absent_fields() {
        let mut map = UpdateMap::new();
        put_present(&mut map, "title", &Nullable::<String>::null()).unwrap();
        put_present(&mut map, "archived", &Nullable::of(false)).unwrap();
        put_present(&mut map, "summary", &Nullable::of(String::new())).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map["archived"], json!(false));
        assert_eq!(map["summary"], json!(""));
    }

    #[test]
    fn require_reports_entity_and_field() {
        let err = require::<String>("case", "creator_id", Nullable::null()).unwrap_err();
        assert!(matches!(
            err,
            MappingError::MissingRequiredField {
                entity: "case",
                field: "creator_id"
            }
        ));
        assert_eq!(require("case", "title", Nullable::of(3)).unwrap(), 3);
    }

    #[test]
    fn require_id_rejects_nil() {
        let err = require_id("team", "owner_id", Nullable::of(ObjectId::NIL)).unwrap_err();
        assert!(matches!(err, MappingError::InvalidField { field: "owner_id", .. }));

        let id = ObjectId::generate();
        assert_eq!(require_id("team", "owner_id", Nullable::of(id)).unwrap(), id);
    }
}
