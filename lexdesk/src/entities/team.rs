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

fn default_seat_limit() -> i64 {
    1
}

/// A firm or practice group sharing cases and a subscription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FieldAssign)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[assign(readonly)]
    pub id: ObjectId,
    pub name: String,
    pub owner_id: ObjectId,
    pub member_ids: Vec<ObjectId>,
    pub subscription_id: ObjectId,
    #[assign(default = default_seat_limit)]
    pub seat_limit: i64,
    #[assign(readonly)]
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamDto {
    pub id: Nullable<ObjectId>,
    pub name: Nullable<String>,
    pub owner_id: Nullable<ObjectId>,
    pub member_ids: Nullable<Vec<ObjectId>>,
    pub subscription_id: Nullable<ObjectId>,
    pub seat_limit: Nullable<i64>,
    pub created_at: Nullable<DateTime<Utc>>,
    pub updated_at: Nullable<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub name: Nullable<String>,
    pub owner_id: Nullable<ObjectId>,
    pub member_ids: Nullable<Vec<ObjectId>>,
    pub seat_limit: Nullable<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, UpdateFields)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateTeamRequest {
    pub name: Nullable<String>,
    pub owner_id: Nullable<ObjectId>,
    pub member_ids: Nullable<Vec<ObjectId>>,
    pub subscription_id: Nullable<ObjectId>,
    pub seat_limit: Nullable<i64>,
}

impl DomainMapping for Team {
    const ENTITY: &'static str = "team";

    type Dto = TeamDto;
    type Create = CreateTeamRequest;
    type Update = UpdateTeamRequest;

    fn to_dto(&self) -> TeamDto {
        TeamDto {
            id: Nullable::of(self.id),
            name: Nullable::of(self.name.clone()),
            owner_id: Nullable::of(self.owner_id),
            member_ids: Nullable::of(self.member_ids.clone()),
            subscription_id: Nullable::of(self.subscription_id),
            seat_limit: Nullable::of(self.seat_limit),
            created_at: Nullable::of(self.created_at),
            updated_at: Nullable::of(self.updated_at),
        }
    }

    fn from_create(request: CreateTeamRequest) -> Result<Self, MappingError> {
        let name = require(Self::ENTITY, "name", request.name)?;
        let owner_id = require_id(Self::ENTITY, "owner_id", request.owner_id)?;

        // The owner is always a member.
        let mut member_ids = request.member_ids.get_or_default();
        if !member_ids.contains(&owner_id) {
            member_ids.insert(0, owner_id);
        }
        let now = Utc::now();

        Ok(Self {
            id: ObjectId::generate(),
            name,
            owner_id,
            member_ids,
            subscription_id: ObjectId::NIL,
            seat_limit: request.seat_limit.into_option().unwrap_or_else(default_seat_limit),
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Team {
    const COLLECTION: &'static str = "teams";

    fn id(&self) -> ObjectId {
        self.id
    }
}

inventory::submit! {
    EntityRegistration::of::<Team>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::to_domain;

    #[test]
    fn name_is_checked_before_owner() {
        let err = to_domain::<Team>(CreateTeamRequest::default()).unwrap_err();
        assert!(matches!(err, MappingError::MissingRequiredField { field: "name", .. }));

        let request = CreateTeamRequest {
            name: Nullable::of("Harbor & Vale".into()),
            ..Default::default()
        };
        let err = to_domain::<Team>(request).unwrap_err();
        assert!(matches!(err, MappingError::MissingRequiredField { field: "owner_id", .. }));
    }

    #[test]
    fn owner_joins_members_once() {
        let owner = ObjectId::generate();
        let other = ObjectId::generate();
        let request = CreateTeamRequest {
            name: Nullable::of("Harbor & Vale".into()),
            owner_id: Nullable::of(owner),
            member_ids: Nullable::of(vec![other]),
            ..Default::default()
        };
        let team = to_domain::<Team>(request).unwrap();
        assert_eq!(team.member_ids, vec![owner, other]);
        assert_eq!(team.seat_limit, 1);
        assert!(team.subscription_id.is_nil());
    }
}
