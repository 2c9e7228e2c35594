//! Field assignment through derived slot tables.

use lexdesk::{
    Assigner, FieldAssign, FieldErrorCollector, FieldErrorKind, Nullable, ObjectId,
    assign::{Assignable, FieldFault, FieldScope},
    entities::{Case, case::CASE_STATUS_OPEN},
    serde_json::{Map, Value, json},
};
use serde::Serialize;

/// Assignable type whose assignment always panics.
#[derive(Debug, Default, Serialize)]
struct Volatile;

impl Assignable for Volatile {
    fn fallback() -> Option<Self> {
        Some(Volatile)
    }

    fn assign_from(&mut self, _input: &Value, _scope: &mut FieldScope<'_>) -> Result<(), FieldFault> {
        panic!("volatile field cannot be written")
    }
}

#[derive(Debug, Default, Serialize, FieldAssign)]
#[serde(rename_all = "camelCase")]
struct Docket {
    #[assign(readonly)]
    id: ObjectId,
    title: String,
    filing_count: i64,
    volatile: Volatile,
    judge_ids: Vec<ObjectId>,
    #[serde(rename = "sealedUntil")]
    sealed: Nullable<String>,
    fee: f64,
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn collecting() -> (Assigner, FieldErrorCollector) {
    let collector = FieldErrorCollector::new();
    (Assigner::with_handler(collector.clone()), collector)
}

#[test]
fn slot_table_follows_declaration_order_and_wire_names() {
    let names: Vec<&str> = Docket::field_slots().iter().map(|slot| slot.wire_name).collect();
    assert_eq!(
        names,
        ["id", "title", "filingCount", "volatile", "judgeIds", "sealedUntil", "fee"]
    );
    assert!(!Docket::field_slots()[0].settable);
}

#[test]
fn one_panicking_field_does_not_stop_the_rest() {
    let (assigner, collector) = collecting();
    let judge = ObjectId::generate();
    let mut docket = Docket::default();
    let source = object(json!({
        "title": "In re Harbor",
        "filingCount": "12",
        "volatile": true,
        "judgeIds": [judge.to_hex()],
        "sealedUntil": "2031-01-01",
        "fee": 12.5,
    }));

    let report = assigner.assign_fields(&mut docket, &source);

    assert_eq!(docket.title, "In re Harbor");
    assert_eq!(docket.filing_count, 12);
    assert_eq!(docket.judge_ids, vec![judge]);
    assert_eq!(docket.sealed.get().map(String::as_str), Some("2031-01-01"));
    assert_eq!(docket.fee, 12.5);

    let errors = collector.take();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, FieldErrorKind::Panic);
    assert_eq!(errors[0].field, "volatile");
    assert!(errors[0].message.contains("cannot be written"));
    assert_eq!(report.errors, 1);
}

#[test]
fn empty_string_keeps_registered_default() {
    let (assigner, collector) = collecting();
    let mut case = Case {
        status: "closed".into(),
        ..Default::default()
    };
    let report = assigner.assign_fields(&mut case, &object(json!({ "status": "" })));

    assert_eq!(case.status, CASE_STATUS_OPEN);
    assert_eq!(report.errors, 1);
    let errors = collector.take();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "status");
    assert_eq!(errors[0].kind, FieldErrorKind::Validation);
}

#[test]
fn bad_sequence_elements_are_reported_by_index() {
    let (assigner, collector) = collecting();
    let good = ObjectId::generate();
    let mut docket = Docket::default();
    let source = object(json!({ "judgeIds": [good.to_hex(), "not-an-id", "000000000000000000000000"] }));

    assigner.assign_fields(&mut docket, &source);

    assert_eq!(docket.judge_ids, vec![good, ObjectId::NIL, ObjectId::NIL]);
    let errors = collector.take();
    let fields: Vec<&str> = errors.iter().map(|error| error.field.as_str()).collect();
    assert_eq!(fields, ["judgeIds[1]", "judgeIds[2]"]);
    assert_eq!(errors[0].kind, FieldErrorKind::TypeMismatch);
    assert_eq!(errors[1].kind, FieldErrorKind::Validation);
}

#[test]
fn read_only_and_unknown_keys() {
    let (assigner, collector) = collecting();
    let id = ObjectId::generate();
    let mut docket = Docket {
        id,
        ..Default::default()
    };
    let source = object(json!({ "id": ObjectId::generate().to_hex(), "courtroom": "4B" }));

    let report = assigner.assign_fields(&mut docket, &source);

    assert_eq!(docket.id, id);
    let errors = collector.take();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, FieldErrorKind::Unsettable);
    assert_eq!(report.errors, 1);
}

#[test]
fn negative_number_falls_back() {
    let (assigner, collector) = collecting();
    let mut docket = Docket {
        filing_count: 3,
        fee: 9.0,
        ..Default::default()
    };
    assigner.assign_fields(&mut docket, &object(json!({ "filingCount": -2, "fee": "-0.01" })));

    assert_eq!(docket.filing_count, 0);
    assert_eq!(docket.fee, 0.0);
    assert!(
        collector
            .take()
            .iter()
            .all(|error| error.kind == FieldErrorKind::Validation)
    );
}
