use chrono::{DateTime, Utc};
use email_address::EmailAddress;
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

pub const USER_ROLE_MEMBER: &str = "member";

fn default_role() -> String {
    USER_ROLE_MEMBER.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FieldAssign)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[assign(readonly)]
    pub id: ObjectId,
    pub email: String,
    pub display_name: String,
    pub avatar_url: String,
    #[assign(default = default_role)]
    pub role: String,
    pub team_ids: Vec<ObjectId>,
    pub email_verified: bool,
    #[serde(default)]
    pub last_login_at: Nullable<DateTime<Utc>>,
    #[assign(readonly)]
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserDto {
    pub id: Nullable<ObjectId>,
    pub email: Nullable<String>,
    pub display_name: Nullable<String>,
    pub avatar_url: Nullable<String>,
    pub role: Nullable<String>,
    pub team_ids: Nullable<Vec<ObjectId>>,
    pub email_verified: Nullable<bool>,
    pub last_login_at: Nullable<DateTime<Utc>>,
    pub created_at: Nullable<DateTime<Utc>>,
    pub updated_at: Nullable<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Nullable<String>,
    pub display_name: Nullable<String>,
    pub avatar_url: Nullable<String>,
    pub role: Nullable<String>,
    pub team_ids: Nullable<Vec<ObjectId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, UpdateFields)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Nullable<String>,
    pub display_name: Nullable<String>,
    pub avatar_url: Nullable<String>,
    pub role: Nullable<String>,
    pub team_ids: Nullable<Vec<ObjectId>>,
    pub email_verified: Nullable<bool>,
    pub last_login_at: Nullable<DateTime<Utc>>,
}

impl DomainMapping for User {
    const ENTITY: &'static str = "user";

    type Dto = UserDto;
    type Create = CreateUserRequest;
    type Update = UpdateUserRequest;

    fn to_dto(&self) -> UserDto {
        UserDto {
            id: Nullable::of(self.id),
            email: Nullable::of(self.email.clone()),
            display_name: Nullable::of(self.display_name.clone()),
            avatar_url: Nullable::of(self.avatar_url.clone()),
            role: Nullable::of(self.role.clone()),
            team_ids: Nullable::of(self.team_ids.clone()),
            email_verified: Nullable::of(self.email_verified),
            // Never-logged-in users keep an absent timestamp.
            last_login_at: self.last_login_at,
            created_at: Nullable::of(self.created_at),
            updated_at: Nullable::of(self.updated_at),
        }
    }

    fn from_create(request: CreateUserRequest) -> Result<Self, MappingError> {
        let email = require(Self::ENTITY, "email", request.email)?;
        if !EmailAddress::is_valid(&email) {
            return Err(MappingError::InvalidField {
                entity: Self::ENTITY,
                field: "email",
                message: format!("`{email}` is not a valid email address"),
            });
        }
        let now = Utc::now();

        Ok(Self {
            id: ObjectId::generate(),
            email,
            display_name: request.display_name.get_or_default(),
            avatar_url: request.avatar_url.get_or_default(),
            role: request.role.into_option().unwrap_or_else(default_role),
            team_ids: request.team_ids.get_or_default(),
            email_verified: false,
            last_login_at: Nullable::null(),
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> ObjectId {
        self.id
    }
}

inventory::submit! {
    EntityRegistration::of::<User>()
}
