use std::{borrow::Cow, fmt};

use serde_json::Value;
use thiserror::Error;

/// Failure while converting between request DTOs and domain records.
#[derive(Debug, Error)]
pub enum MappingError {
    /// A field the entity cannot exist without was absent or null.
    #[error("missing required field `{field}` for {entity}")]
    MissingRequiredField { entity: &'static str, field: &'static str },

    /// A present field carried a value the entity rejects.
    #[error("invalid value for `{field}` on {entity}: {message}")]
    InvalidField {
        entity: &'static str,
        field: &'static str,
        message: String,
    },

    /// Request body did not match the DTO shape.
    #[error("failed to decode {entity} request: {source}")]
    Decode {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A present value could not be turned into a document value.
    #[error("failed to encode field `{field}`: {source}")]
    Encode {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by document stores and repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying Redis command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored document or update value did not round-trip through JSON.
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store settings could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Insert collided with an existing document.
    #[error("document {id} already exists in {collection}")]
    Duplicate { collection: String, id: String },

    /// Update map touched a field that is fixed at creation.
    #[error("field `{field}` cannot be updated")]
    ImmutableField { field: String },

    #[error("{message}")]
    Other { message: Cow<'static, str> },
}

/// Category of a single failed field assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldErrorKind {
    TypeMismatch,
    Unsettable,
    NoDefaultValue,
    Validation,
    Panic,
}

impl FieldErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldErrorKind::TypeMismatch => "type_mismatch",
            FieldErrorKind::Unsettable => "unsettable",
            FieldErrorKind::NoDefaultValue => "no_default_value",
            FieldErrorKind::Validation => "validation",
            FieldErrorKind::Panic => "panic",
        }
    }
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rejected field from an assignment pass.
///
/// Field errors never abort assignment. They are handed to the assigner's
/// [`FieldErrorHandler`](crate::assign::FieldErrorHandler) and the field falls
/// back to its default value.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message} ({kind})")]
pub struct FieldError {
    /// Wire name of the field, with `[index]` suffixes for sequence elements.
    pub field: String,
    /// The offending input, when there was one.
    pub input: Option<Value>,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, input: Option<Value>, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            input,
            kind,
            message: message.into(),
        }
    }
}

/// Errors loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment variable {name} not set (referenced by `{key}`)")]
    MissingVariable { name: String, key: &'static str },
}
