//! Entity auto-registration via the inventory crate.
//!
//! Each entity module submits an [`EntityRegistration`], which lets the CLI
//! (and anything else working from an entity name instead of a type) decode
//! requests and run the assigner without a hand-maintained dispatch table.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    assign::{AssignReport, Assigner, FieldAssign},
    errors::MappingError,
    id::ObjectId,
    mapping::{DomainMapping, UpdateFields, UpdateMap, to_domain},
    repository::Entity,
};

/// Record produced by an assignment pass, serialized for display.
#[derive(Debug, Clone)]
pub struct AssignOutput {
    pub record: Value,
    pub report: AssignReport,
}

/// Record built from a create request.
#[derive(Debug, Clone)]
pub struct CreatedRecord {
    pub id: ObjectId,
    /// The record as it is stored.
    pub document: Value,
    /// The record as a response DTO.
    pub dto: Value,
}

/// Type-erased entry points for one entity.
pub struct EntityRegistration {
    /// Entity name, e.g. `"case"`.
    pub entity: &'static str,
    /// Storage collection, e.g. `"cases"`.
    pub collection: &'static str,
    /// Decodes an update request body into its sparse update map.
    pub decode_update: fn(Value) -> Result<UpdateMap, MappingError>,
    /// Decodes a create request body into a new record.
    pub create: fn(Value) -> Result<CreatedRecord, MappingError>,
    /// Assigns an untyped map onto a default record.
    pub assign: fn(&Map<String, Value>, &Assigner) -> Result<AssignOutput, MappingError>,
}

impl EntityRegistration {
    pub const fn of<R>() -> Self
    where
        R: DomainMapping + Entity + FieldAssign + Default,
        R::Dto: Serialize,
        R::Create: DeserializeOwned,
        R::Update: DeserializeOwned,
    {
        Self {
            entity: R::ENTITY,
            collection: R::COLLECTION,
            decode_update: decode_update::<R>,
            create: create_record::<R>,
            assign: assign_record::<R>,
        }
    }
}

inventory::collect!(EntityRegistration);

pub fn registered_entities() -> impl Iterator<Item = &'static EntityRegistration> {
    inventory::iter::<EntityRegistration>()
}

/// Looks an entity up by entity name or collection name.
pub fn find_entity(name: &str) -> Option<&'static EntityRegistration> {
    registered_entities().find(|registration| registration.entity == name || registration.collection == name)
}

pub fn decode_update<R>(body: Value) -> Result<UpdateMap, MappingError>
where
    R: DomainMapping,
    R::Update: DeserializeOwned,
{
    let request: R::Update =
        serde_json::from_value(body).map_err(|source| MappingError::Decode { entity: R::ENTITY, source })?;
    request.update_fields_to_map()
}

pub fn create_record<R>(body: Value) -> Result<CreatedRecord, MappingError>
where
    R: DomainMapping + Entity,
    R::Dto: Serialize,
    R::Create: DeserializeOwned,
{
    let request: R::Create =
        serde_json::from_value(body).map_err(|source| MappingError::Decode { entity: R::ENTITY, source })?;
    let record = to_domain::<R>(request)?;
    let encode = |source| MappingError::Encode {
        field: R::ENTITY.to_string(),
        source,
    };
    Ok(CreatedRecord {
        id: record.id(),
        document: serde_json::to_value(&record).map_err(encode)?,
        dto: serde_json::to_value(record.to_dto()).map_err(encode)?,
    })
}

pub fn assign_record<R>(source: &Map<String, Value>, assigner: &Assigner) -> Result<AssignOutput, MappingError>
where
    R: DomainMapping + FieldAssign + Default + Serialize,
{
    let mut record = R::default();
    let report = assigner.assign_fields(&mut record, source);
    let record = serde_json::to_value(&record).map_err(|source| MappingError::Encode {
        field: R::ENTITY.to_string(),
        source,
    })?;
    Ok(AssignOutput { record, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::FieldErrorCollector;
    use serde_json::json;

    #[test]
    fn every_entity_is_registered() {
        let mut names: Vec<&str> = registered_entities().map(|registration| registration.entity).collect();
        names.sort_unstable();
        assert_eq!(names, ["agent", "case", "plan", "subscription", "team", "user"]);
    }

    #[test]
    fn lookup_by_entity_or_collection() {
        assert_eq!(find_entity("case").map(|r| r.collection), Some("cases"));
        assert_eq!(find_entity("plans").map(|r| r.entity), Some("plan"));
        assert!(find_entity("invoice").is_none());
    }

    #[test]
    fn decode_update_through_registration() {
        let registration = find_entity("team").unwrap();
        let map = (registration.decode_update)(json!({ "name": "Renamed", "seatLimit": null })).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["name"], json!("Renamed"));

        let err = (registration.decode_update)(json!({ "seatLimit": "many" })).unwrap_err();
        assert!(matches!(err, MappingError::Decode { entity: "team", .. }));
    }

    #[test]
    fn assign_through_registration() {
        let registration = find_entity("agent").unwrap();
        let collector = FieldErrorCollector::new();
        let assigner = Assigner::with_handler(collector.clone());
        let source = json!({ "name": "Drafting", "maxTokens": "2048", "temperature": -1 });

        let output = (registration.assign)(source.as_object().unwrap(), &assigner).unwrap();
        assert_eq!(output.record["name"], json!("Drafting"));
        assert_eq!(output.record["maxTokens"], json!(2048));
        assert_eq!(output.record["temperature"], json!(0.2));
        assert_eq!(output.report.errors, 1);
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn create_through_registration() {
        let registration = find_entity("plans").unwrap();
        let created = (registration.create)(json!({ "name": "Firm", "priceCents": 4900 })).unwrap();

        assert!(!created.id.is_nil());
        assert_eq!(created.document["id"], json!(created.id.to_hex()));
        assert_eq!(created.document["currency"], json!("usd"));
        assert_eq!(created.dto["priceCents"], json!(4900));

        let err = (registration.create)(json!({ "name": "Firm" })).unwrap_err();
        assert!(matches!(err, MappingError::MissingRequiredField { entity: "plan", .. }));
    }
}
