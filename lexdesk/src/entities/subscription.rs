use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    FieldAssign, UpdateFields,
    assign::{Assignable, FieldFault, FieldScope},
    coerce::{Coerced, TargetType, coerce},
    errors::MappingError,
    id::ObjectId,
    mapping::{DomainMapping, require, require_id},
    nullable::Nullable,
    registry::EntityRegistration,
    repository::Entity,
};

pub const SUBSCRIPTION_STATUS_ACTIVE: &str = "active";

fn default_status() -> String {
    SUBSCRIPTION_STATUS_ACTIVE.to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionKind {
    Trial,
    #[default]
    Monthly,
    Annual,
}

impl SubscriptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionKind::Trial => "trial",
            SubscriptionKind::Monthly => "monthly",
            SubscriptionKind::Annual => "annual",
        }
    }
}

impl fmt::Display for SubscriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trial" => Ok(SubscriptionKind::Trial),
            "monthly" => Ok(SubscriptionKind::Monthly),
            "annual" => Ok(SubscriptionKind::Annual),
            other => Err(format!("unknown subscription kind `{other}`")),
        }
    }
}

impl Assignable for SubscriptionKind {
    fn fallback() -> Option<Self> {
        Some(SubscriptionKind::default())
    }

    fn assign_from(&mut self, input: &Value, _scope: &mut FieldScope<'_>) -> Result<(), FieldFault> {
        let coerced = coerce(input, TargetType::String).map_err(|err| FieldFault::type_mismatch(err.to_string()))?;
        let Coerced::String(raw) = coerced else {
            return Err(FieldFault::type_mismatch("expected a string"));
        };
        *self = raw.parse().map_err(FieldFault::validation)?;
        Ok(())
    }
}

/// A team's (or a solo user's) paid access to a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FieldAssign)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[assign(readonly)]
    pub id: ObjectId,
    pub plan_id: ObjectId,
    pub team_id: ObjectId,
    pub user_id: ObjectId,
    pub kind: SubscriptionKind,
    #[assign(default = default_status)]
    pub status: String,
    #[assign(no_default)]
    pub expires_at: DateTime<Utc>,
    pub cancel_at_period_end: bool,
    /// Identifier at the payment provider.
    pub external_ref: String,
    #[assign(readonly)]
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubscriptionDto {
    pub id: Nullable<ObjectId>,
    pub plan_id: Nullable<ObjectId>,
    pub team_id: Nullable<ObjectId>,
    pub user_id: Nullable<ObjectId>,
    pub kind: Nullable<SubscriptionKind>,
    pub status: Nullable<String>,
    pub expires_at: Nullable<DateTime<Utc>>,
    pub cancel_at_period_end: Nullable<bool>,
    pub external_ref: Nullable<String>,
    pub created_at: Nullable<DateTime<Utc>>,
    pub updated_at: Nullable<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub plan_id: Nullable<ObjectId>,
    pub expires_at: Nullable<DateTime<Utc>>,
    pub kind: Nullable<SubscriptionKind>,
    pub team_id: Nullable<ObjectId>,
    pub user_id: Nullable<ObjectId>,
    pub external_ref: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, UpdateFields)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateSubscriptionRequest {
    pub plan_id: Nullable<ObjectId>,
    pub kind: Nullable<SubscriptionKind>,
    pub status: Nullable<String>,
    pub expires_at: Nullable<DateTime<Utc>>,
    pub cancel_at_period_end: Nullable<bool>,
    pub external_ref: Nullable<String>,
}

impl DomainMapping for Subscription {
    const ENTITY: &'static str = "subscription";

    type Dto = SubscriptionDto;
    type Create = CreateSubscriptionRequest;
    type Update = UpdateSubscriptionRequest;

    fn to_dto(&self) -> SubscriptionDto {
        SubscriptionDto {
            id: Nullable::of(self.id),
            plan_id: Nullable::of(self.plan_id),
            team_id: Nullable::of(self.team_id),
            user_id: Nullable::of(self.user_id),
            kind: Nullable::of(self.kind),
            status: Nullable::of(self.status.clone()),
            expires_at: Nullable::of(self.expires_at),
            cancel_at_period_end: Nullable::of(self.cancel_at_period_end),
            external_ref: Nullable::of(self.external_ref.clone()),
            created_at: Nullable::of(self.created_at),
            updated_at: Nullable::of(self.updated_at),
        }
    }

    fn from_create(request: CreateSubscriptionRequest) -> Result<Self, MappingError> {
        let plan_id = require_id(Self::ENTITY, "plan_id", request.plan_id)?;
        let expires_at = require(Self::ENTITY, "expires_at", request.expires_at)?;
        let kind = require(Self::ENTITY, "kind", request.kind)?;
        let now = Utc::now();

        Ok(Self {
            id: ObjectId::generate(),
            plan_id,
            team_id: request.team_id.get_or_default(),
            user_id: request.user_id.get_or_default(),
            kind,
            status: default_status(),
            expires_at,
            cancel_at_period_end: false,
            external_ref: request.external_ref.get_or_default(),
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Subscription {
    const COLLECTION: &'static str = "subscriptions";

    fn id(&self) -> ObjectId {
        self.id
    }
}

inventory::submit! {
    EntityRegistration::of::<Subscription>()
}
