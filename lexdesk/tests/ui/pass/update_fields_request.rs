use lexdesk::{Nullable, UpdateFields, serde_json::json};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, UpdateFields)]
#[serde(default, rename_all = "camelCase")]
struct UpdateMatterRequest {
    display_title: Nullable<String>,
    #[serde(rename = "billable")]
    is_billable: Nullable<bool>,
    #[assign(skip)]
    internal_note: Nullable<String>,
}

fn main() {
    let request: UpdateMatterRequest =
        lexdesk::serde_json::from_value(json!({ "displayTitle": "", "billable": false, "internalNote": "x" })).unwrap();
    let map = lexdesk::UpdateFields::update_fields_to_map(&request).unwrap();

    assert_eq!(map.len(), 2);
    assert_eq!(map["displayTitle"], json!(""));
    assert_eq!(map["billable"], json!(false));
    assert!(request.internal_note.is_present());
}
