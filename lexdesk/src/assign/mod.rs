//! Field-by-field assignment of untyped maps onto typed records.
//!
//! Records opt in with `#[derive(FieldAssign)]`, which emits one [`FieldSlot`]
//! per field. Each slot knows its wire name and how to assign into its field
//! through the [`Assignable`] implementation of the field's type, so there is
//! no runtime type inspection: an unsupported field type is a compile error.
//!
//! Assignment is best effort. A field that cannot take its input is reported
//! to the [`FieldErrorHandler`] and falls back to its default; the rest of the
//! record is still assigned. A slot that panics is isolated the same way.
//!
//! ```text
//! #[derive(Default, FieldAssign)]
//! struct Case {
//!     #[assign(readonly)]
//!     id: ObjectId,
//!     #[assign(rename = "creatorId")]
//!     creator_id: ObjectId,
//!     #[assign(default = default_status)]
//!     status: String,
//!     tags: Vec<String>,
//! }
//!
//! let mut case = Case::default();
//! let report = Assigner::default().assign_fields(&mut case, &source);
//! ```

mod assignable;

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, PoisonError},
};

use serde_json::{Map, Value};

pub use assignable::Assignable;

use crate::errors::{FieldError, FieldErrorKind};

/// Receives every field error produced by an [`Assigner`].
pub trait FieldErrorHandler: Send + Sync {
    fn handle(&self, error: FieldError);
}

impl<F> FieldErrorHandler for F
where
    F: Fn(FieldError) + Send + Sync,
{
    fn handle(&self, error: FieldError) {
        self(error)
    }
}

/// Default handler: log and carry on.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFieldErrors;

impl FieldErrorHandler for LogFieldErrors {
    fn handle(&self, error: FieldError) {
        log::warn!(
            "field `{}` rejected ({}): {}",
            error.field,
            error.kind,
            error.message
        );
    }
}

/// Handler that keeps every error for callers wanting strict semantics.
///
/// Clones share the same buffer, so one clone can be handed to the assigner and
/// the other inspected after `assign_fields` returns.
#[derive(Debug, Clone, Default)]
pub struct FieldErrorCollector {
    errors: Arc<Mutex<Vec<FieldError>>>,
}

impl FieldErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<FieldError> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drains the collected errors.
    pub fn take(&self) -> Vec<FieldError> {
        std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FieldErrorHandler for FieldErrorCollector {
    fn handle(&self, error: FieldError) {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).push(error);
    }
}

/// Where a field's value comes from when its input is absent or rejected.
pub enum Fallback<T> {
    /// The type-level default, [`Assignable::fallback`].
    Type,
    /// A per-field default provider, from `#[assign(default = path)]`.
    Custom(fn() -> T),
    /// No default; from `#[assign(no_default)]`.
    Disabled,
}

/// What happened to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    /// The input was coerced, validated and stored.
    Applied,
    /// The default value was stored.
    Defaulted,
    /// The field kept its previous value.
    Untouched,
}

/// Rejection of an input by an [`Assignable`] type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFault {
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldFault {
    pub fn new(kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(FieldErrorKind::TypeMismatch, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FieldErrorKind::Validation, message)
    }
}

/// Error reporting context for one field, or one element of a sequence field.
pub struct FieldScope<'a> {
    path: String,
    handler: &'a dyn FieldErrorHandler,
    reported: usize,
}

impl<'a> FieldScope<'a> {
    pub fn new(path: impl Into<String>, handler: &'a dyn FieldErrorHandler) -> Self {
        Self {
            path: path.into(),
            handler,
            reported: 0,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of errors reported through this scope and its element scopes.
    pub fn reported(&self) -> usize {
        self.reported
    }

    pub fn report(&mut self, kind: FieldErrorKind, input: Option<&Value>, message: impl Into<String>) {
        self.reported += 1;
        self.handler
            .handle(FieldError::new(self.path.clone(), input.cloned(), kind, message));
    }

    /// Runs `f` in a scope for element `index`, folding its error count back in.
    pub fn element<R>(&mut self, index: usize, f: impl FnOnce(&mut FieldScope<'a>) -> R) -> R {
        let mut child = FieldScope::new(format!("{}[{}]", self.path, index), self.handler);
        let result = f(&mut child);
        self.reported += child.reported;
        result
    }
}

/// Assigns `input` into `target` with default fallback.
///
/// Absent and `null` inputs take the default. Inputs the type rejects are
/// reported and then take the default. When no default exists the field is
/// reported as `NoDefaultValue` and left as it was.
pub fn assign_slot<T>(target: &mut T, input: Option<&Value>, fallback: Fallback<T>, scope: &mut FieldScope<'_>) -> SlotOutcome
where
    T: Assignable,
{
    let value = match input {
        None | Some(Value::Null) => return apply_fallback(target, input, fallback, scope),
        Some(value) => value,
    };

    match target.assign_from(value, scope) {
        Ok(()) => SlotOutcome::Applied,
        Err(fault) => {
            scope.report(fault.kind, Some(value), fault.message);
            apply_fallback(target, input, fallback, scope)
        }
    }
}

fn apply_fallback<T>(target: &mut T, input: Option<&Value>, fallback: Fallback<T>, scope: &mut FieldScope<'_>) -> SlotOutcome
where
    T: Assignable,
{
    let default = match fallback {
        Fallback::Type => T::fallback(),
        Fallback::Custom(provider) => Some(provider()),
        Fallback::Disabled => None,
    };
    match default {
        Some(value) => {
            *target = value;
            SlotOutcome::Defaulted
        }
        None => {
            scope.report(
                FieldErrorKind::NoDefaultValue,
                input,
                format!("no default value for {}", std::any::type_name::<T>()),
            );
            SlotOutcome::Untouched
        }
    }
}

/// Assignment entry for one field of `R`.
pub struct FieldSlot<R> {
    /// Rust field name.
    pub name: &'static str,
    /// Key looked up in the source map.
    pub wire_name: &'static str,
    /// Read-only slots reject any non-null input as `Unsettable`.
    pub settable: bool,
    pub assign: fn(&mut R, Option<&Value>, &mut FieldScope<'_>) -> SlotOutcome,
}

impl<R> FieldSlot<R> {
    pub fn new(
        name: &'static str,
        wire_name: &'static str,
        settable: bool,
        assign: fn(&mut R, Option<&Value>, &mut FieldScope<'_>) -> SlotOutcome,
    ) -> Self {
        Self {
            name,
            wire_name,
            settable,
            assign,
        }
    }
}

/// Records that expose a field table. Implemented by `#[derive(FieldAssign)]`.
pub trait FieldAssign: Sized {
    fn field_slots() -> Vec<FieldSlot<Self>>;
}

/// Tally of one `assign_fields` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignReport {
    pub applied: usize,
    pub defaulted: usize,
    pub untouched: usize,
    pub errors: usize,
}

impl AssignReport {
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

/// Applies string-keyed untyped maps onto [`FieldAssign`] records.
///
/// Holds nothing but the error handler; one assigner can be shared freely
/// across threads and requests.
#[derive(Clone)]
pub struct Assigner {
    handler: Arc<dyn FieldErrorHandler>,
}

impl Default for Assigner {
    fn default() -> Self {
        Self::with_handler(LogFieldErrors)
    }
}

impl Assigner {
    pub fn with_handler(handler: impl FieldErrorHandler + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Assigns every slot of `destination` from `source`.
    ///
    /// Never fails: field errors go to the handler and the affected fields take
    /// their defaults. Keys in `source` without a matching slot are ignored.
    pub fn assign_fields<R>(&self, destination: &mut R, source: &Map<String, Value>) -> AssignReport
    where
        R: FieldAssign,
    {
        let slots = R::field_slots();
        let mut report = AssignReport::default();

        for slot in &slots {
            let input = source.get(slot.wire_name);
            let mut scope = FieldScope::new(slot.wire_name, self.handler.as_ref());

            if !slot.settable {
                if input.is_some_and(|value| !value.is_null()) {
                    scope.report(FieldErrorKind::Unsettable, input, "field is read-only");
                }
                report.untouched += 1;
                report.errors += scope.reported();
                continue;
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (slot.assign)(destination, input, &mut scope)));
            match outcome {
                Ok(SlotOutcome::Applied) => report.applied += 1,
                Ok(SlotOutcome::Defaulted) => report.defaulted += 1,
                Ok(SlotOutcome::Untouched) => report.untouched += 1,
                Err(payload) => {
                    scope.report(FieldErrorKind::Panic, input, panic_message(payload.as_ref()));
                    report.untouched += 1;
                }
            }
            report.errors += scope.reported();
        }

        for key in source.keys() {
            if !slots.iter().any(|slot| slot.wire_name == key) {
                log::debug!("ignoring unknown field `{key}`");
            }
        }

        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "field assignment panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{id::ObjectId, nullable::Nullable};
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Matter {
        id: ObjectId,
        title: String,
        hours: i64,
        tags: Vec<String>,
        note: Nullable<String>,
        sealed: String,
    }

    impl FieldAssign for Matter {
        fn field_slots() -> Vec<FieldSlot<Self>> {
            vec![
                FieldSlot::<Self>::new("id", "id", false, |record, input, scope| {
                    assign_slot(&mut record.id, input, Fallback::Type, scope)
                }),
                FieldSlot::<Self>::new("title", "title", true, |record, input, scope| {
                    assign_slot(&mut record.title, input, Fallback::Type, scope)
                }),
                FieldSlot::<Self>::new("hours", "billedHours", true, |record, input, scope| {
                    assign_slot(&mut record.hours, input, Fallback::Type, scope)
                }),
                FieldSlot::<Self>::new("tags", "tags", true, |record, input, scope| {
                    assign_slot(&mut record.tags, input, Fallback::Type, scope)
                }),
                FieldSlot::<Self>::new("note", "note", true, |record, input, scope| {
                    assign_slot(&mut record.note, input, Fallback::Type, scope)
                }),
                FieldSlot::<Self>::new("sealed", "sealed", true, |record, input, scope| {
                    assign_slot(&mut record.sealed, input, Fallback::Disabled, scope)
                }),
            ]
        }
    }

    /// Same shape, but one slot panics when it runs.
    #[derive(Debug, Default)]
    struct FragileMatter {
        title: String,
        hours: i64,
    }

    impl FieldAssign for FragileMatter {
        fn field_slots() -> Vec<FieldSlot<Self>> {
            vec![
                FieldSlot::<Self>::new("title", "title", true, |record, input, scope| {
                    assign_slot(&mut record.title, input, Fallback::Type, scope)
                }),
                FieldSlot::<Self>::new("fragile", "fragile", true, |_, _, _| panic!("fragile field exploded")),
                FieldSlot::<Self>::new("hours", "billedHours", true, |record, input, scope| {
                    assign_slot(&mut record.hours, input, Fallback::Type, scope)
                }),
            ]
        }
    }

    fn collecting() -> (Assigner, FieldErrorCollector) {
        let collector = FieldErrorCollector::new();
        (Assigner::with_handler(collector.clone()), collector)
    }

    fn source(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn assigns_and_coerces_every_field() {
        let (assigner, errors) = collecting();
        let mut matter = Matter {
            title: "stale".into(),
            hours: 99,
            ..Matter::default()
        };
        let report = assigner.assign_fields(
            &mut matter,
            &source(json!({
                "title": "Smith v. Jones",
                "billedHours": 12.7,
                "tags": ["appeal", "estate"],
                "note": "first draft",
                "sealed": "yes",
                "unknown": true,
            })),
        );

        assert!(errors.is_empty(), "unexpected errors: {:?}", errors.errors());
        assert_eq!(matter.title, "Smith v. Jones");
        assert_eq!(matter.hours, 12);
        assert_eq!(matter.tags, vec!["appeal".to_string(), "estate".to_string()]);
        assert_eq!(matter.note.get().map(String::as_str), Some("first draft"));
        assert_eq!(matter.sealed, "yes");
        assert_eq!(report.applied, 5);
        assert_eq!(report.untouched, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn mixed_sequence_is_a_type_mismatch() {
        let (assigner, errors) = collecting();
        let mut matter = Matter {
            tags: vec!["keep".into()],
            ..Matter::default()
        };
        assigner.assign_fields(&mut matter, &source(json!({ "tags": ["a", 1], "sealed": "x" })));

        let errors = errors.take();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "tags");
        assert_eq!(errors[0].kind, FieldErrorKind::TypeMismatch);
        assert!(matter.tags.is_empty());
    }

    #[test]
    fn sequence_element_errors_are_indexed() {
        let (assigner, errors) = collecting();
        let mut matter = Matter::default();
        assigner.assign_fields(&mut matter, &source(json!({ "tags": ["a", "", "c"], "sealed": "x" })));

        assert_eq!(matter.tags, vec!["a".to_string(), String::new(), "c".to_string()]);
        let errors = errors.take();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "tags[1]");
        assert_eq!(errors[0].kind, FieldErrorKind::Validation);
    }

    #[test]
    fn absent_fields_take_defaults() {
        let (assigner, errors) = collecting();
        let mut matter = Matter {
            title: "old".into(),
            hours: 4,
            tags: vec!["x".into()],
            note: Nullable::of("n".into()),
            sealed: "kept".into(),
            ..Matter::default()
        };
        let report = assigner.assign_fields(&mut matter, &Map::new());

        assert_eq!(matter.title, "");
        assert_eq!(matter.hours, 0);
        assert!(matter.tags.is_empty());
        assert!(matter.note.is_null());
        // `sealed` has no default, so it stays as it was.
        assert_eq!(matter.sealed, "kept");
        let errors = errors.take();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, FieldErrorKind::NoDefaultValue);
        assert_eq!(report.defaulted, 4);
        assert_eq!(report.untouched, 2);
    }

    #[test]
    fn null_is_treated_as_absent() {
        let (assigner, errors) = collecting();
        let mut matter = Matter {
            note: Nullable::of("n".into()),
            ..Matter::default()
        };
        assigner.assign_fields(&mut matter, &source(json!({ "note": null, "sealed": "x" })));
        assert!(matter.note.is_null());
        assert!(errors.is_empty());
    }

    #[test]
    fn rejected_nullable_stays_absent() {
        let (assigner, errors) = collecting();
        let mut matter = Matter::default();
        assigner.assign_fields(&mut matter, &source(json!({ "note": "", "sealed": "x" })));
        assert!(matter.note.is_null());
        assert_eq!(errors.take()[0].kind, FieldErrorKind::Validation);
    }

    #[test]
    fn read_only_field_reports_unsettable() {
        let (assigner, errors) = collecting();
        let original = ObjectId::generate();
        let mut matter = Matter {
            id: original,
            ..Matter::default()
        };
        assigner.assign_fields(
            &mut matter,
            &source(json!({ "id": ObjectId::generate().to_hex(), "sealed": "x" })),
        );
        assert_eq!(matter.id, original);
        let errors = errors.take();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, FieldErrorKind::Unsettable);
    }

    #[test]
    fn validation_failure_keeps_the_default() {
        let (assigner, errors) = collecting();
        let mut matter = Matter::default();
        assigner.assign_fields(&mut matter, &source(json!({ "title": "", "billedHours": -3, "sealed": "x" })));
        assert_eq!(matter.title, "");
        assert_eq!(matter.hours, 0);
        let kinds: Vec<_> = errors.take().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![FieldErrorKind::Validation, FieldErrorKind::Validation]);
    }

    #[test]
    fn panicking_slot_is_isolated() {
        let (assigner, errors) = collecting();
        let mut matter = FragileMatter::default();
        let report = assigner.assign_fields(
            &mut matter,
            &source(json!({ "title": "Estate of Doe", "fragile": "boom", "billedHours": "3" })),
        );

        assert_eq!(matter.title, "Estate of Doe");
        assert_eq!(matter.hours, 3);
        let errors = errors.take();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, FieldErrorKind::Panic);
        assert_eq!(errors[0].field, "fragile");
        assert_eq!(errors[0].message, "fragile field exploded");
        assert_eq!(report.applied, 2);
        assert_eq!(report.errors, 1);
    }

    #[test]
    fn closure_handlers_receive_errors() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let assigner = Assigner::with_handler(move |error: FieldError| {
            sink.lock().unwrap().push(error.field);
        });
        let mut matter = Matter::default();
        assigner.assign_fields(&mut matter, &source(json!({ "billedHours": "lots", "sealed": "x" })));
        assert_eq!(*seen.lock().unwrap(), vec!["billedHours".to_string()]);
    }
}
