//! Conversion of untyped document values into statically expected types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::id::ObjectId;

/// Static type a value is being coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    String,
    Integer,
    Float,
    Boolean,
    Timestamp,
    ObjectId,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetType::String => "string",
            TargetType::Integer => "integer",
            TargetType::Float => "float",
            TargetType::Boolean => "boolean",
            TargetType::Timestamp => "timestamp",
            TargetType::ObjectId => "object id",
        };
        f.write_str(name)
    }
}

/// Result of a successful coercion, tagged by target.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    ObjectId(ObjectId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot coerce {source_kind} {input} into {target}: {reason}")]
pub struct CoercionError {
    pub source_kind: &'static str,
    pub target: TargetType,
    pub input: String,
    pub reason: String,
}

impl CoercionError {
    fn new(value: &Value, target: TargetType, reason: impl Into<String>) -> Self {
        Self {
            source_kind: value_kind(value),
            target,
            input: value.to_string(),
            reason: reason.into(),
        }
    }

    fn unsupported(value: &Value, target: TargetType) -> Self {
        Self::new(value, target, "unsupported source type")
    }
}

/// JSON kind name used in error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Coerces `value` into `target`.
///
/// Pure and deterministic. `null` is rejected for every target except
/// [`TargetType::String`]; callers decide what absence means before coercing.
pub fn coerce(value: &Value, target: TargetType) -> Result<Coerced, CoercionError> {
    match target {
        TargetType::String => Ok(Coerced::String(stringify(value))),
        TargetType::Integer => coerce_integer(value).map(Coerced::Integer),
        TargetType::Float => coerce_float(value).map(Coerced::Float),
        TargetType::Boolean => coerce_boolean(value).map(Coerced::Boolean),
        TargetType::Timestamp => coerce_timestamp(value).map(Coerced::Timestamp),
        TargetType::ObjectId => coerce_object_id(value).map(Coerced::ObjectId),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn coerce_integer(value: &Value) -> Result<i64, CoercionError> {
    match value {
        Value::Number(number) => integer_from_number(value, number),
        Value::String(raw) => raw
            .parse::<i64>()
            .map_err(|err| CoercionError::new(value, TargetType::Integer, err.to_string())),
        other => Err(CoercionError::unsupported(other, TargetType::Integer)),
    }
}

/// Integral numbers pass through; fractional ones truncate toward zero.
fn integer_from_number(value: &Value, number: &Number) -> Result<i64, CoercionError> {
    if let Some(int) = number.as_i64() {
        return Ok(int);
    }
    if number.is_u64() {
        return Err(CoercionError::new(value, TargetType::Integer, "out of range"));
    }
    let float = number
        .as_f64()
        .ok_or_else(|| CoercionError::new(value, TargetType::Integer, "not representable"))?;
    truncate_float(float).ok_or_else(|| CoercionError::new(value, TargetType::Integer, "out of range"))
}

fn truncate_float(float: f64) -> Option<i64> {
    // i64::MAX is not exactly representable; 2^63 is the first float past it.
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if !float.is_finite() || float < -UPPER || float >= UPPER {
        return None;
    }
    Some(float.trunc() as i64)
}

/// Only finite results; `NaN` and infinities have no JSON encoding.
fn coerce_float(value: &Value) -> Result<f64, CoercionError> {
    let float = match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| CoercionError::new(value, TargetType::Float, "not representable"))?,
        Value::String(raw) => raw
            .parse::<f64>()
            .map_err(|err| CoercionError::new(value, TargetType::Float, err.to_string()))?,
        other => return Err(CoercionError::unsupported(other, TargetType::Float)),
    };
    if !float.is_finite() {
        return Err(CoercionError::new(value, TargetType::Float, "not a finite number"));
    }
    Ok(float)
}

fn coerce_boolean(value: &Value) -> Result<bool, CoercionError> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(true),
            "false" | "f" | "0" => Ok(false),
            _ => Err(CoercionError::new(value, TargetType::Boolean, "expected true or false")),
        },
        other => Err(CoercionError::unsupported(other, TargetType::Boolean)),
    }
}

fn coerce_timestamp(value: &Value) -> Result<DateTime<Utc>, CoercionError> {
    match value {
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|err| CoercionError::new(value, TargetType::Timestamp, err.to_string())),
        Value::Number(number) => timestamp_from_epoch(number)
            .ok_or_else(|| CoercionError::new(value, TargetType::Timestamp, "epoch seconds out of range")),
        other => Err(CoercionError::unsupported(other, TargetType::Timestamp)),
    }
}

/// Unix epoch seconds; a fractional part becomes nanoseconds.
fn timestamp_from_epoch(number: &Number) -> Option<DateTime<Utc>> {
    if let Some(secs) = number.as_i64() {
        return DateTime::from_timestamp(secs, 0);
    }
    let float = number.as_f64()?;
    if !float.is_finite() {
        return None;
    }
    let secs = float.floor();
    let nanos = ((float - secs) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(truncate_float(secs)?, nanos.min(999_999_999))
}

fn coerce_object_id(value: &Value) -> Result<ObjectId, CoercionError> {
    match value {
        Value::String(raw) => {
            ObjectId::parse_str(raw).map_err(|err| CoercionError::new(value, TargetType::ObjectId, err.to_string()))
        }
        other => Err(CoercionError::unsupported(other, TargetType::ObjectId)),
    }
}
