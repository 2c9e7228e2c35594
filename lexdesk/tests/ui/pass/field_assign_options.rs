use lexdesk::{Assigner, FieldAssign, FieldErrorCollector, ObjectId, serde_json::json};

fn default_stage() -> String {
    "intake".to_string()
}

#[derive(Debug, Default, serde::Serialize, FieldAssign)]
#[serde(rename_all = "camelCase")]
struct Intake {
    #[assign(readonly)]
    id: ObjectId,
    client_name: String,
    #[assign(default = default_stage)]
    stage: String,
    #[assign(rename = "conflictsCleared")]
    cleared: bool,
    #[assign(no_default)]
    retainer_cents: i64,
    #[assign(skip)]
    scratch: Vec<u8>,
}

fn main() {
    let collector = FieldErrorCollector::new();
    let assigner = Assigner::with_handler(collector.clone());
    let mut intake = Intake {
        retainer_cents: 500,
        ..Default::default()
    };
    let source = json!({ "clientName": "Acme", "conflictsCleared": "t" });
    let report = assigner.assign_fields(&mut intake, source.as_object().unwrap());

    assert_eq!(intake.client_name, "Acme");
    assert_eq!(intake.stage, "intake");
    assert!(intake.cleared);
    assert_eq!(intake.retainer_cents, 500);
    assert!(intake.scratch.is_empty());
    assert_eq!(report.errors, 1);
    assert_eq!(collector.len(), 1);
}
