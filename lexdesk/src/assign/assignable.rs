use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{Fallback, FieldFault, FieldScope, assign_slot};
use crate::{
    coerce::{Coerced, TargetType, coerce, value_kind},
    id::ObjectId,
    nullable::Nullable,
};

/// Field types the assigner can write.
///
/// `assign_from` must leave `self` unchanged when it returns an error; the
/// caller then applies the fallback.
pub trait Assignable: Sized {
    /// Type-level default used when input is absent or rejected.
    fn fallback() -> Option<Self>;

    fn assign_from(&mut self, input: &Value, scope: &mut FieldScope<'_>) -> Result<(), FieldFault>;
}

fn coerce_input(input: &Value, target: TargetType) -> Result<Coerced, FieldFault> {
    coerce(input, target).map_err(|err| FieldFault::type_mismatch(err.to_string()))
}

fn non_negative<N>(value: N) -> Result<N, FieldFault>
where
    N: PartialOrd + Default,
{
    if value < N::default() {
        Err(FieldFault::validation("must not be negative"))
    } else {
        Ok(value)
    }
}

impl Assignable for String {
    fn fallback() -> Option<Self> {
        Some(String::new())
    }

    fn assign_from(&mut self, input: &Value, _scope: &mut FieldScope<'_>) -> Result<(), FieldFault> {
        let Coerced::String(value) = coerce_input(input, TargetType::String)? else {
            return Err(FieldFault::type_mismatch("expected a string"));
        };
        if value.is_empty() {
            return Err(FieldFault::validation("must not be empty"));
        }
        *self = value;
        Ok(())
    }
}

impl Assignable for i64 {
    fn fallback() -> Option<Self> {
        Some(0)
    }

    fn assign_from(&mut self, input: &Value, _scope: &mut FieldScope<'_>) -> Result<(), FieldFault> {
        let Coerced::Integer(value) = coerce_input(input, TargetType::Integer)? else {
            return Err(FieldFault::type_mismatch("expected an integer"));
        };
        *self = non_negative(value)?;
        Ok(())
    }
}

impl Assignable for i32 {
    fn fallback() -> Option<Self> {
        Some(0)
    }

    fn assign_from(&mut self, input: &Value, _scope: &mut FieldScope<'_>) -> Result<(), FieldFault> {
        let Coerced::Integer(value) = coerce_input(input, TargetType::Integer)? else {
            return Err(FieldFault::type_mismatch("expected an integer"));
        };
        let narrowed = i32::try_from(value).map_err(|_| FieldFault::type_mismatch(format!("{value} is out of range")))?;
        *self = non_negative(narrowed)?;
        Ok(())
    }
}

impl Assignable for f64 {
    fn fallback() -> Option<Self> {
        Some(0.0)
    }

    fn assign_from(&mut self, input: &Value, _scope: &mut FieldScope<'_>) -> Result<(), FieldFault> {
        let Coerced::Float(value) = coerce_input(input, TargetType::Float)? else {
            return Err(FieldFault::type_mismatch("expected a number"));
        };
        *self = non_negative(value)?;
        Ok(())
    }
}

impl Assignable for bool {
    fn fallback() -> Option<Self> {
        Some(false)
    }

    fn assign_from(&mut self, input: &Value, _scope: &mut FieldScope<'_>) -> Result<(), FieldFault> {
        let Coerced::Boolean(value) = coerce_input(input, TargetType::Boolean)? else {
            return Err(FieldFault::type_mismatch("expected a boolean"));
        };
        *self = value;
        Ok(())
    }
}

impl Assignable for ObjectId {
    fn fallback() -> Option<Self> {
        Some(ObjectId::NIL)
    }

    fn assign_from(&mut self, input: &Value, _scope: &mut FieldScope<'_>) -> Result<(), FieldFault> {
        let Coerced::ObjectId(value) = coerce_input(input, TargetType::ObjectId)? else {
            return Err(FieldFault::type_mismatch("expected an object id"));
        };
        if value.is_nil() {
            return Err(FieldFault::validation("must not be the nil identifier"));
        }
        *self = value;
        Ok(())
    }
}

impl Assignable for DateTime<Utc> {
    fn fallback() -> Option<Self> {
        Some(DateTime::<Utc>::default())
    }

    fn assign_from(&mut self, input: &Value, _scope: &mut FieldScope<'_>) -> Result<(), FieldFault> {
        let Coerced::Timestamp(value) = coerce_input(input, TargetType::Timestamp)? else {
            return Err(FieldFault::type_mismatch("expected a timestamp"));
        };
        *self = value;
        Ok(())
    }
}

/// Free-form document values are stored as given.
impl Assignable for Value {
    fn fallback() -> Option<Self> {
        Some(Value::Null)
    }

    fn assign_from(&mut self, input: &Value, _scope: &mut FieldScope<'_>) -> Result<(), FieldFault> {
        *self = input.clone();
        Ok(())
    }
}

/// Elements are assigned by position into a sequence sized to the input.
/// A rejected element is reported under `field[index]` and takes the element
/// default; the rest of the sequence is kept.
impl<T> Assignable for Vec<T>
where
    T: Assignable + Default,
{
    fn fallback() -> Option<Self> {
        Some(Vec::new())
    }

    fn assign_from(&mut self, input: &Value, scope: &mut FieldScope<'_>) -> Result<(), FieldFault> {
        let Value::Array(items) = input else {
            return Err(FieldFault::type_mismatch(format!(
                "expected an array, got {}",
                value_kind(input)
            )));
        };

        let mut kinds = items.iter().filter(|item| !item.is_null()).map(value_kind);
        if let Some(first) = kinds.next()
            && let Some(other) = kinds.find(|kind| *kind != first)
        {
            return Err(FieldFault::type_mismatch(format!(
                "array elements must share one type, found {first} and {other}"
            )));
        }

        let mut assigned = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut element = T::default();
            scope.element(index, |element_scope| {
                assign_slot(&mut element, Some(item), Fallback::Type, element_scope)
            });
            assigned.push(element);
        }
        *self = assigned;
        Ok(())
    }
}

/// The inner value goes through a transient; presence is set only when the
/// inner assignment succeeds.
impl<T> Assignable for Nullable<T>
where
    T: Assignable + Default,
{
    fn fallback() -> Option<Self> {
        Some(Nullable::null())
    }

    fn assign_from(&mut self, input: &Value, scope: &mut FieldScope<'_>) -> Result<(), FieldFault> {
        let mut inner = T::default();
        inner.assign_from(input, scope)?;
        self.set(inner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assign::{FieldErrorCollector, SlotOutcome},
        errors::FieldErrorKind,
    };
    use serde_json::json;

    fn assign<T: Assignable>(target: &mut T, input: Value) -> (SlotOutcome, Vec<crate::errors::FieldError>) {
        let collector = FieldErrorCollector::new();
        let mut scope = FieldScope::new("field", &collector);
        let outcome = assign_slot(target, Some(&input), Fallback::Type, &mut scope);
        (outcome, collector.take())
    }

    #[test]
    fn string_accepts_stringified_numbers() {
        let mut value = String::from("old");
        let (outcome, errors) = assign(&mut value, json!(42));
        assert_eq!(outcome, SlotOutcome::Applied);
        assert!(errors.is_empty());
        assert_eq!(value, "42");
    }

    #[test]
    fn empty_string_falls_back_to_default() {
        let mut value = String::from("old");
        let (outcome, errors) = assign(&mut value, json!(""));
        assert_eq!(outcome, SlotOutcome::Defaulted);
        assert_eq!(value, "");
        assert_eq!(errors[0].kind, FieldErrorKind::Validation);
    }

    #[test]
    fn integer_narrowing_and_range() {
        let mut small = 5_i32;
        let (_, errors) = assign(&mut small, json!(10_000_000_000_i64));
        assert_eq!(small, 0);
        assert_eq!(errors[0].kind, FieldErrorKind::TypeMismatch);

        let mut wide = 0_i64;
        assign(&mut wide, json!("77"));
        assert_eq!(wide, 77);
    }

    #[test]
    fn negative_float_is_rejected() {
        let mut value = 1.5_f64;
        let (_, errors) = assign(&mut value, json!(-0.5));
        assert_eq!(value, 0.0);
        assert_eq!(errors[0].kind, FieldErrorKind::Validation);
    }

    #[test]
    fn boolean_false_is_applied() {
        let mut value = true;
        let (outcome, errors) = assign(&mut value, json!("false"));
        assert_eq!(outcome, SlotOutcome::Applied);
        assert!(errors.is_empty());
        assert!(!value);
    }

    #[test]
    fn nil_identifier_is_rejected() {
        let mut value = ObjectId::generate();
        let (_, errors) = assign(&mut value, json!("000000000000000000000000"));
        assert!(value.is_nil());
        assert_eq!(errors[0].kind, FieldErrorKind::Validation);
    }

    #[test]
    fn timestamp_from_epoch_seconds() {
        let mut value = DateTime::<Utc>::default();
        assign(&mut value, json!(86_400));
        assert_eq!(value.to_rfc3339(), "1970-01-02T00:00:00+00:00");
    }

    #[test]
    fn non_array_into_sequence_is_a_mismatch() {
        let mut value = vec![1_i64, 2];
        let (outcome, errors) = assign(&mut value, json!("1,2"));
        assert_eq!(outcome, SlotOutcome::Defaulted);
        assert!(value.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, FieldErrorKind::TypeMismatch);
        assert_eq!(errors[0].field, "field");
    }

    #[test]
    fn sequence_grows_to_input_length() {
        let mut value: Vec<i64> = Vec::new();
        let (_, errors) = assign(&mut value, json!([1, 2.9, null]));
        assert!(errors.is_empty());
        assert_eq!(value, vec![1, 2, 0]);
    }

    #[test]
    fn nested_nullable_sequence() {
        let mut value: Nullable<Vec<String>> = Nullable::null();
        let (outcome, _) = assign(&mut value, json!(["a", "b"]));
        assert_eq!(outcome, SlotOutcome::Applied);
        assert_eq!(value.get().map(Vec::len), Some(2));
    }

    #[test]
    fn nullable_stays_absent_on_rejection() {
        let mut value: Nullable<i64> = Nullable::of(4);
        let (outcome, errors) = assign(&mut value, json!("four"));
        assert_eq!(outcome, SlotOutcome::Defaulted);
        assert!(value.is_null());
        assert_eq!(errors[0].kind, FieldErrorKind::TypeMismatch);
    }
}
