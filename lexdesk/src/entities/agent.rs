use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    FieldAssign, UpdateFields,
    errors::MappingError,
    id::ObjectId,
    mapping::{DomainMapping, require, require_id},
    nullable::Nullable,
    registry::EntityRegistration,
    repository::Entity,
};

pub const DEFAULT_AGENT_MODEL: &str = "standard";
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

fn default_model() -> String {
    DEFAULT_AGENT_MODEL.to_string()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_enabled() -> bool {
    true
}

/// A configured assistant that works on cases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FieldAssign)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[assign(readonly)]
    pub id: ObjectId,
    pub name: String,
    pub owner_id: ObjectId,
    pub team_id: ObjectId,
    pub description: String,
    #[assign(default = default_model)]
    pub model: String,
    pub instructions: String,
    #[assign(default = default_temperature)]
    pub temperature: f64,
    pub max_tokens: i64,
    pub tools: Vec<String>,
    #[assign(default = default_enabled)]
    pub enabled: bool,
    #[assign(readonly)]
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentDto {
    pub id: Nullable<ObjectId>,
    pub name: Nullable<String>,
    pub owner_id: Nullable<ObjectId>,
    pub team_id: Nullable<ObjectId>,
    pub description: Nullable<String>,
    pub model: Nullable<String>,
    pub instructions: Nullable<String>,
    pub temperature: Nullable<f64>,
    pub max_tokens: Nullable<i64>,
    pub tools: Nullable<Vec<String>>,
    pub enabled: Nullable<bool>,
    pub created_at: Nullable<DateTime<Utc>>,
    pub updated_at: Nullable<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateAgentRequest {
    pub name: Nullable<String>,
    pub owner_id: Nullable<ObjectId>,
    pub team_id: Nullable<ObjectId>,
    pub description: Nullable<String>,
    pub model: Nullable<String>,
    pub instructions: Nullable<String>,
    pub temperature: Nullable<f64>,
    pub max_tokens: Nullable<i64>,
    pub tools: Nullable<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, UpdateFields)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateAgentRequest {
    pub name: Nullable<String>,
    pub team_id: Nullable<ObjectId>,
    pub description: Nullable<String>,
    pub model: Nullable<String>,
    pub instructions: Nullable<String>,
    pub temperature: Nullable<f64>,
    pub max_tokens: Nullable<i64>,
    pub tools: Nullable<Vec<String>>,
    pub enabled: Nullable<bool>,
}

impl DomainMapping for Agent {
    const ENTITY: &'static str = "agent";

    type Dto = AgentDto;
    type Create = CreateAgentRequest;
    type Update = UpdateAgentRequest;

    fn to_dto(&self) -> AgentDto {
        AgentDto {
            id: Nullable::of(self.id),
            name: Nullable::of(self.name.clone()),
            owner_id: Nullable::of(self.owner_id),
            team_id: Nullable::of(self.team_id),
            description: Nullable::of(self.description.clone()),
            model: Nullable::of(self.model.clone()),
            instructions: Nullable::of(self.instructions.clone()),
            temperature: Nullable::of(self.temperature),
            max_tokens: Nullable::of(self.max_tokens),
            tools: Nullable::of(self.tools.clone()),
            enabled: Nullable::of(self.enabled),
            created_at: Nullable::of(self.created_at),
            updated_at: Nullable::of(self.updated_at),
        }
    }

    fn from_create(request: CreateAgentRequest) -> Result<Self, MappingError> {
        let name = require(Self::ENTITY, "name", request.name)?;
        let owner_id = require_id(Self::ENTITY, "owner_id", request.owner_id)?;
        let now = Utc::now();

        Ok(Self {
            id: ObjectId::generate(),
            name,
            owner_id,
            team_id: request.team_id.get_or_default(),
            description: request.description.get_or_default(),
            model: request.model.into_option().unwrap_or_else(default_model),
            instructions: request.instructions.get_or_default(),
            temperature: request.temperature.get_or_else(DEFAULT_TEMPERATURE),
            max_tokens: request.max_tokens.get_or_default(),
            tools: request.tools.get_or_default(),
            enabled: true,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Agent {
    const COLLECTION: &'static str = "agents";

    fn id(&self) -> ObjectId {
        self.id
    }
}

inventory::submit! {
    EntityRegistration::of::<Agent>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assign::{Assigner, FieldErrorCollector},
        errors::FieldErrorKind,
        mapping::{UpdateFields, to_domain},
    };
    use serde_json::json;

    #[test]
    fn owner_must_be_a_real_id() {
        let request = CreateAgentRequest {
            name: Nullable::of("Discovery reviewer".into()),
            owner_id: Nullable::of(ObjectId::NIL),
            ..Default::default()
        };
        assert!(matches!(
            to_domain::<Agent>(request),
            Err(MappingError::InvalidField { field: "owner_id", .. })
        ));
    }

    #[test]
    fn zero_temperature_is_kept() {
        let request = CreateAgentRequest {
            name: Nullable::of("Discovery reviewer".into()),
            owner_id: Nullable::of(ObjectId::generate()),
            temperature: Nullable::of(0.0),
            ..Default::default()
        };
        let agent = to_domain::<Agent>(request).unwrap();
        assert_eq!(agent.temperature, 0.0);
        assert_eq!(agent.model, DEFAULT_AGENT_MODEL);
        assert!(agent.enabled);
    }

    #[test]
    fn disabling_writes_false() {
        let request: UpdateAgentRequest = serde_json::from_value(json!({ "enabled": false })).unwrap();
        let map = request.update_fields_to_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["enabled"], json!(false));
    }

    #[test]
    fn non_finite_temperature_falls_back() {
        for raw in ["NaN", "inf", "-inf"] {
            let collector = FieldErrorCollector::new();
            let assigner = Assigner::with_handler(collector.clone());
            let mut agent = Agent::default();
            let source = json!({ "name": "Intake", "temperature": raw });

            let report = assigner.assign_fields(&mut agent, source.as_object().unwrap());

            assert_eq!(agent.temperature, DEFAULT_TEMPERATURE, "{raw}");
            assert_eq!(report.errors, 1);
            let errors = collector.take();
            assert_eq!(errors[0].field, "temperature");
            assert_eq!(errors[0].kind, FieldErrorKind::TypeMismatch);

            let encoded = serde_json::to_value(&agent).unwrap();
            assert_eq!(encoded["temperature"], json!(DEFAULT_TEMPERATURE));
            assert_eq!(serde_json::from_value::<Agent>(encoded).unwrap(), agent);
        }
    }
}
