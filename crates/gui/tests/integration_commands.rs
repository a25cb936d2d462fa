//! Integration tests for the AgentCommand JSON protocol.
//!
//! Tests the full command pipeline: JSON string -> parse -> execute -> response.

use bimview_gui_lib::command::{execute_json, execute_json_batch};
use bimview_gui_lib::harness::TestHarness;

#[test]
fn test_command_load_bim_and_inspect() {
    let mut h = TestHarness::new();

    let resp = execute_json(&mut h, r#"{"command": "load_bim"}"#).unwrap();
    assert!(resp.success);

    let resp = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap();
    assert!(resp.success);
    let data = resp.data.unwrap();
    // Two lights plus the model
    assert_eq!(data["node_count"], 3);
    let panel = data["panel"].as_array().unwrap();
    assert_eq!(panel.last().unwrap(), "show bim");
    assert_eq!(data["camera_enabled"], true);
}

#[test]
fn test_command_load_ply_reports_nodes() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "load_ply"}"#).unwrap();
    assert!(resp.success);
    let data = resp.data.unwrap();
    assert!(data["points"].as_str().is_some());
    assert!(data["control"].as_str().is_some());
    assert_eq!(h.point_cloud_count(), 1);
}

#[test]
fn test_command_pick_element_and_clear() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "load_bim", "path": "/Duplex_A_20110907.frag"},
        {"command": "pick_element", "fragment": "F1", "express_id": 42},
        {"command": "inspect"},
        {"command": "clear_selection"},
        {"command": "inspect"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses.len(), 5);
    assert!(responses.iter().all(|r| r.success));

    let pick = responses[1].data.as_ref().unwrap();
    assert_eq!(pick["hit"], true);
    assert_eq!(pick["id"], 42);
    assert_eq!(pick["fragments"], serde_json::json!(["F1"]));

    let selected = responses[2].data.as_ref().unwrap();
    assert_eq!(selected["selection"], serde_json::json!({ "F1": [42] }));

    let cleared = responses[4].data.as_ref().unwrap();
    assert!(cleared["selection"].is_null());
}

#[test]
fn test_command_pick_miss() {
    let mut h = TestHarness::new();
    execute_json(&mut h, r#"{"command": "load_bim", "path": "/Duplex_A_20110907.frag"}"#).unwrap();

    let json = r#"{"command": "pick", "origin": [0, 500, 0], "direction": [0, 1, 0]}"#;
    let resp = execute_json(&mut h, json).unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["hit"], false);
}

#[test]
fn test_command_drag_gizmo_toggles_camera() {
    let mut h = TestHarness::new();
    execute_json(&mut h, r#"{"command": "load_ply"}"#).unwrap();

    let resp = execute_json(&mut h, r#"{"command": "drag_gizmo", "axis": "z", "amount": 2.0}"#).unwrap();
    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data["moved"], true);
    assert_eq!(data["camera_enabled_during_drag"], false);
    assert_eq!(data["camera_enabled"], true);
}

#[test]
fn test_command_drag_gizmo_without_point_cloud() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "drag_gizmo", "axis": "x", "amount": 1.0}"#).unwrap();
    assert!(!resp.success);
    assert!(resp.error.is_some());
}

#[test]
fn test_command_set_visible_hides_points() {
    let mut h = TestHarness::new();
    execute_json(&mut h, r#"{"command": "load_ply"}"#).unwrap();

    let resp = execute_json(
        &mut h,
        r#"{"command": "set_visible", "label": "show ply", "visible": false}"#,
    )
    .unwrap();
    assert!(resp.success);
    assert_eq!(h.toggle_value("show ply"), Some(false));
    assert_eq!(h.toggle_value("show ply control"), Some(true));
}

#[test]
fn test_command_export_and_dispose() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "load_bim", "path": "/Duplex_A_20110907.frag"},
        {"command": "export_fragments"},
        {"command": "dispose"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert!(responses.iter().all(|r| r.success));

    let exported = responses[1].data.as_ref().unwrap()["fragments_json"]
        .as_str()
        .unwrap();
    let bundle: shared::FragmentsBundle = serde_json::from_str(exported).unwrap();
    assert_eq!(bundle.models.len(), 1);
    // The reinforcing bar fragment is excluded on load
    assert_eq!(bundle.models[0].fragments.len(), 3);

    assert_eq!(responses[2].data.as_ref().unwrap()["removed"], 1);
    assert_eq!(h.model_count(), 0);
}

#[test]
fn test_command_unknown_command_rejected() {
    let mut h = TestHarness::new();
    let result = execute_json(&mut h, r#"{"command": "explode"}"#);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Invalid command JSON"));
}
