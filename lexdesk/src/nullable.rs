//! Presence-tracking field wrapper used by every request and response DTO.
//!
//! A [`Nullable<T>`] separates "the client did not send this field" from "the
//! client sent this field with a zero value". On the wire an absent value is
//! `null` (JSON) or `nil` (MessagePack); anything else is present.
//!
//! DTOs are declared with `#[serde(default)]` so that a missing key decodes as
//! absent as well. Encoding always emits the key, so `{"name": null}` survives a
//! decode/encode round trip unchanged.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::id::ObjectId;

/// Types with a zero representation recognised by [`Nullable::new`].
pub trait ZeroValue {
    fn is_zero_value(&self) -> bool;
}

impl ZeroValue for String {
    fn is_zero_value(&self) -> bool {
        self.is_empty()
    }
}

/// `false` is a meaningful answer, never "unset".
impl ZeroValue for bool {
    fn is_zero_value(&self) -> bool {
        false
    }
}

macro_rules! integer_zero_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ZeroValue for $ty {
                fn is_zero_value(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

integer_zero_value!(i32, i64, u32, u64);

impl ZeroValue for f64 {
    fn is_zero_value(&self) -> bool {
        *self == 0.0
    }
}

impl ZeroValue for ObjectId {
    fn is_zero_value(&self) -> bool {
        self.is_nil()
    }
}

/// The zero timestamp is the Unix epoch, matching `DateTime::<Utc>::default()`.
impl ZeroValue for DateTime<Utc> {
    fn is_zero_value(&self) -> bool {
        self.timestamp() == 0 && self.timestamp_subsec_nanos() == 0
    }
}

impl<T> ZeroValue for Vec<T> {
    fn is_zero_value(&self) -> bool {
        self.is_empty()
    }
}

impl ZeroValue for Value {
    fn is_zero_value(&self) -> bool {
        self.is_null()
    }
}

/// A value plus a presence flag.
///
/// When `present` is false the stored value is meaningless even if it happens to
/// hold something; every accessor treats it as unset.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Nullable<T> {
    value: T,
    present: bool,
}

impl<T: ZeroValue> Nullable<T> {
    /// Wraps `value`, inferring presence from its zero representation.
    ///
    /// Empty strings, zero numbers, the nil identifier, the epoch timestamp and
    /// empty sequences come back absent; `false` comes back present. This cannot
    /// tell "explicitly zero" from "never set", so mappers build DTOs with
    /// [`Nullable::of`] instead.
    pub fn new(value: T) -> Self {
        let present = !value.is_zero_value();
        Self { value, present }
    }
}

impl<T> Nullable<T> {
    /// Wraps `value` as present, whatever it is.
    pub const fn of(value: T) -> Self {
        Self { value, present: true }
    }

    pub const fn with_presence(value: T, present: bool) -> Self {
        Self { value, present }
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn is_null(&self) -> bool {
        !self.present
    }

    /// Marks the wrapper present with `value`.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.present = true;
    }

    pub fn get(&self) -> Option<&T> {
        self.present.then_some(&self.value)
    }

    /// Raw stored value, ignoring presence.
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn as_ref(&self) -> Nullable<&T> {
        Nullable {
            value: &self.value,
            present: self.present,
        }
    }

    pub fn into_option(self) -> Option<T> {
        if self.present { Some(self.value) } else { None }
    }

    pub fn get_or_else(self, default: T) -> T {
        if self.present { self.value } else { default }
    }

    pub fn or_else<F>(self, f: F) -> Self
    where
        F: FnOnce() -> Self,
    {
        if self.present { self } else { f() }
    }
}

impl<T: Default> Nullable<T> {
    pub fn null() -> Self {
        Self {
            value: T::default(),
            present: false,
        }
    }

    pub fn get_or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }

    /// Resets to the zero value and marks absent.
    pub fn clear(&mut self) {
        self.value = T::default();
        self.present = false;
    }

    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&T) -> bool,
    {
        if self.present && predicate(&self.value) {
            self
        } else {
            Self::null()
        }
    }

    pub fn map<U, F>(self, f: F) -> Nullable<U>
    where
        U: Default,
        F: FnOnce(T) -> U,
    {
        if self.present {
            Nullable::of(f(self.value))
        } else {
            Nullable::null()
        }
    }

    pub fn flat_map<U, F>(self, f: F) -> Nullable<U>
    where
        U: Default,
        F: FnOnce(T) -> Nullable<U>,
    {
        if self.present { f(self.value) } else { Nullable::null() }
    }
}

impl<T: Default> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Nullable::of(value),
            None => Nullable::null(),
        }
    }
}

impl<T> From<Nullable<T>> for Option<T> {
    fn from(value: Nullable<T>) -> Self {
        value.into_option()
    }
}

impl<T: fmt::Debug> fmt::Debug for Nullable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.present {
            f.debug_tuple("Nullable").field(&self.value).finish()
        } else {
            f.write_str("Null")
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.present {
            self.value.serialize(serializer)
        } else {
            serializer.serialize_none()
        }
    }
}

impl<'de, T> Deserialize<'de> for Nullable<T>
where
    T: Deserialize<'de> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Nullable::from)
    }
}
