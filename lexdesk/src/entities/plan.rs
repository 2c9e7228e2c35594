use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    FieldAssign, UpdateFields,
    errors::MappingError,
    id::ObjectId,
    mapping::{DomainMapping, require},
    nullable::Nullable,
    registry::EntityRegistration,
    repository::Entity,
};

pub const DEFAULT_CURRENCY: &str = "usd";
pub const DEFAULT_BILLING_INTERVAL: &str = "month";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_interval() -> String {
    DEFAULT_BILLING_INTERVAL.to_string()
}

fn default_active() -> bool {
    true
}

/// A purchasable tier. Prices are integral minor units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FieldAssign)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[assign(readonly)]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    #[assign(default = default_currency)]
    pub currency: String,
    #[assign(default = default_interval)]
    pub interval: String,
    pub features: Vec<String>,
    pub seat_limit: i64,
    pub case_limit: i64,
    #[assign(default = default_active)]
    pub active: bool,
    #[assign(readonly)]
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanDto {
    pub id: Nullable<ObjectId>,
    pub name: Nullable<String>,
    pub description: Nullable<String>,
    pub price_cents: Nullable<i64>,
    pub currency: Nullable<String>,
    pub interval: Nullable<String>,
    pub features: Nullable<Vec<String>>,
    pub seat_limit: Nullable<i64>,
    pub case_limit: Nullable<i64>,
    pub active: Nullable<bool>,
    pub created_at: Nullable<DateTime<Utc>>,
    pub updated_at: Nullable<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatePlanRequest {
    pub name: Nullable<String>,
    pub description: Nullable<String>,
    pub price_cents: Nullable<i64>,
    pub currency: Nullable<String>,
    pub interval: Nullable<String>,
    pub features: Nullable<Vec<String>>,
    pub seat_limit: Nullable<i64>,
    pub case_limit: Nullable<i64>,
    pub active: Nullable<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, UpdateFields)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePlanRequest {
    pub name: Nullable<String>,
    pub description: Nullable<String>,
    pub price_cents: Nullable<i64>,
    pub features: Nullable<Vec<String>>,
    pub seat_limit: Nullable<i64>,
    pub case_limit: Nullable<i64>,
    pub active: Nullable<bool>,
}

impl DomainMapping for Plan {
    const ENTITY: &'static str = "plan";

    type Dto = PlanDto;
    type Create = CreatePlanRequest;
    type Update = UpdatePlanRequest;

    fn to_dto(&self) -> PlanDto {
        PlanDto {
            id: Nullable::of(self.id),
            name: Nullable::of(self.name.clone()),
            description: Nullable::of(self.description.clone()),
            price_cents: Nullable::of(self.price_cents),
            currency: Nullable::of(self.currency.clone()),
            interval: Nullable::of(self.interval.clone()),
            features: Nullable::of(self.features.clone()),
            seat_limit: Nullable::of(self.seat_limit),
            case_limit: Nullable::of(self.case_limit),
            active: Nullable::of(self.active),
            created_at: Nullable::of(self.created_at),
            updated_at: Nullable::of(self.updated_at),
        }
    }

    fn from_create(request: CreatePlanRequest) -> Result<Self, MappingError> {
        let name = require(Self::ENTITY, "name", request.name)?;
        let price_cents = require(Self::ENTITY, "price_cents", request.price_cents)?;
        if price_cents < 0 {
            return Err(MappingError::InvalidField {
                entity: Self::ENTITY,
                field: "price_cents",
                message: format!("{price_cents} is negative"),
            });
        }
        let now = Utc::now();

        Ok(Self {
            id: ObjectId::generate(),
            name,
            description: request.description.get_or_default(),
            price_cents,
            currency: request.currency.into_option().unwrap_or_else(default_currency),
            interval: request.interval.into_option().unwrap_or_else(default_interval),
            features: request.features.get_or_default(),
            seat_limit: request.seat_limit.get_or_default(),
            case_limit: request.case_limit.get_or_default(),
            active: request.active.get_or_else(true),
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Plan {
    const COLLECTION: &'static str = "plans";

    fn id(&self) -> ObjectId {
        self.id
    }
}

inventory::submit! {
    EntityRegistration::of::<Plan>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::to_domain;

    #[test]
    fn free_plan_is_valid() {
        let request = CreatePlanRequest {
            name: Nullable::of("Solo".into()),
            price_cents: Nullable::of(0),
            ..Default::default()
        };
        let plan = to_domain::<Plan>(request).unwrap();
        assert_eq!(plan.price_cents, 0);
        assert_eq!(plan.currency, DEFAULT_CURRENCY);
        assert_eq!(plan.interval, DEFAULT_BILLING_INTERVAL);
        assert!(plan.active);
    }

    #[test]
    fn price_is_required_after_name() {
        let request = CreatePlanRequest {
            name: Nullable::of("Solo".into()),
            ..Default::default()
        };
        let err = to_domain::<Plan>(request).unwrap_err();
        assert!(matches!(
            err,
            MappingError::MissingRequiredField {
                entity: "plan",
                field: "price_cents"
            }
        ));
    }

    #[test]
    fn negative_price_is_invalid() {
        let request = CreatePlanRequest {
            name: Nullable::of("Solo".into()),
            price_cents: Nullable::of(-100),
            ..Default::default()
        };
        assert!(matches!(
            to_domain::<Plan>(request),
            Err(MappingError::InvalidField { field: "price_cents", .. })
        ));
    }

    #[test]
    fn explicitly_inactive_plan_stays_inactive() {
        let request = CreatePlanRequest {
            name: Nullable::of("Legacy".into()),
            price_cents: Nullable::of(4900),
            active: Nullable::of(false),
            ..Default::default()
        };
        assert!(!to_domain::<Plan>(request).unwrap().active);
    }
}
