use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    FieldAssign, UpdateFields,
    errors::MappingError,
    id::ObjectId,
    mapping::{DomainMapping, require_id},
    nullable::Nullable,
    registry::EntityRegistration,
    repository::Entity,
};

pub const CASE_STATUS_OPEN: &str = "open";

fn default_status() -> String {
    CASE_STATUS_OPEN.to_string()
}

/// A legal matter worked on by a team and its agents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FieldAssign)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    #[assign(readonly)]
    pub id: ObjectId,
    pub creator_id: ObjectId,
    pub team_id: ObjectId,
    pub title: String,
    pub description: String,
    #[assign(default = default_status)]
    pub status: String,
    pub tags: Vec<String>,
    pub agent_ids: Vec<ObjectId>,
    pub archived: bool,
    #[assign(readonly)]
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaseDto {
    pub id: Nullable<ObjectId>,
    pub creator_id: Nullable<ObjectId>,
    pub team_id: Nullable<ObjectId>,
    pub title: Nullable<String>,
    pub description: Nullable<String>,
    pub status: Nullable<String>,
    pub tags: Nullable<Vec<String>>,
    pub agent_ids: Nullable<Vec<ObjectId>>,
    pub archived: Nullable<bool>,
    pub created_at: Nullable<DateTime<Utc>>,
    pub updated_at: Nullable<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCaseRequest {
    pub creator_id: Nullable<ObjectId>,
    pub team_id: Nullable<ObjectId>,
    pub title: Nullable<String>,
    pub description: Nullable<String>,
    pub status: Nullable<String>,
    pub tags: Nullable<Vec<String>>,
    pub agent_ids: Nullable<Vec<ObjectId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, UpdateFields)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateCaseRequest {
    pub team_id: Nullable<ObjectId>,
    pub title: Nullable<String>,
    pub description: Nullable<String>,
    pub status: Nullable<String>,
    pub tags: Nullable<Vec<String>>,
    pub agent_ids: Nullable<Vec<ObjectId>>,
    pub archived: Nullable<bool>,
}

impl DomainMapping for Case {
    const ENTITY: &'static str = "case";

    type Dto = CaseDto;
    type Create = CreateCaseRequest;
    type Update = UpdateCaseRequest;

    fn to_dto(&self) -> CaseDto {
        CaseDto {
            id: Nullable::of(self.id),
            creator_id: Nullable::of(self.creator_id),
            team_id: Nullable::of(self.team_id),
            title: Nullable::of(self.title.clone()),
            description: Nullable::of(self.description.clone()),
            status: Nullable::of(self.status.clone()),
            tags: Nullable::of(self.tags.clone()),
            agent_ids: Nullable::of(self.agent_ids.clone()),
            archived: Nullable::of(self.archived),
            created_at: Nullable::of(self.created_at),
            updated_at: Nullable::of(self.updated_at),
        }
    }

    fn from_create(request: CreateCaseRequest) -> Result<Self, MappingError> {
        let creator_id = require_id(Self::ENTITY, "creator_id", request.creator_id)?;
        let now = Utc::now();

        Ok(Self {
            id: ObjectId::generate(),
            creator_id,
            team_id: request.team_id.get_or_default(),
            title: request.title.get_or_default(),
            description: request.description.get_or_default(),
            status: request.status.into_option().unwrap_or_else(default_status),
            tags: request.tags.get_or_default(),
            agent_ids: request.agent_ids.get_or_default(),
            archived: false,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Case {
    const COLLECTION: &'static str = "cases";

    fn id(&self) -> ObjectId {
        self.id
    }
}

inventory::submit! {
    EntityRegistration::of::<Case>()
}
