//! LexDesk persistence core.
//!
//! Presence-tracking DTO fields ([`Nullable`]), value coercion, the field
//! assigner used by dynamic partial updates, per-entity DTO mappers and the
//! document stores those updates are written to.

extern crate self as lexdesk;

pub mod assign;
pub mod coerce;
pub mod config;
pub mod entities;
pub mod errors;
pub mod id;
pub mod keys;
pub mod mapping;
pub mod nullable;
pub mod registry;
pub mod repository;
pub mod store;

pub use assign::{AssignReport, Assigner, FieldAssign, FieldErrorCollector, FieldErrorHandler, LogFieldErrors};
pub use coerce::{Coerced, CoercionError, TargetType, coerce};
pub use config::AppConfig;
pub use errors::{ConfigError, FieldError, FieldErrorKind, MappingError, StoreError};
pub use id::ObjectId;
pub use lexdesk_macros::{FieldAssign, UpdateFields};
pub use mapping::{DomainMapping, UpdateFields, UpdateMap, records_to_dto, to_domain, to_dto};
pub use nullable::Nullable;
pub use repository::{Entity, Repo};
pub use store::{ConfiguredStore, DocumentStore, MemoryStore, RedisStore, store_from_config};

pub use inventory;
pub use serde_json;
