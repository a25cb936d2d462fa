//! Integration tests for TestHarness.
//!
//! Drives loading, picking and the gizmo end to end through the headless harness.

use approx::assert_abs_diff_eq;
use bimview_gui_lib::fixtures::{self, DUPLEX_FRAG, DUPLEX_IFC, DUPLEX_PLY};
use bimview_gui_lib::harness::TestHarness;
use bimview_gui_lib::state::scene::NodeKind;
use bimview_gui_lib::transform::{GizmoAxis, POINT_CLOUD_ROTATION, TRANSFORM_CONTROL_SIZE};

#[test]
fn test_harness_load_ifc_adds_model_and_toggle() {
    let mut h = TestHarness::new();
    let before = h.node_count();

    let id = h.load_bim(DUPLEX_IFC).unwrap();

    assert_eq!(h.node_count(), before + 1);
    assert_eq!(h.model_count(), 1);
    assert!(matches!(h.state.scene.get(&id).unwrap().kind, NodeKind::Model(_)));
    assert!(h.panel_labels().contains(&"show bim".to_string()));
    assert_eq!(h.toggle_value("show bim"), Some(true));
}

#[test]
fn test_harness_pick_tessellated_ifc_wall() {
    let mut h = TestHarness::new();
    h.load_bim(DUPLEX_IFC).unwrap();
    let walls = "Duplex_A_20110907-ifcwallstandardcase";

    let hit = h.click_element(walls, 42).unwrap();
    assert_eq!(hit.id, 42);
    assert_eq!(hit.fragments, vec![walls.to_string()]);
    assert_eq!(h.selection().unwrap()[walls], vec![42]);
    assert!(h.state.highlighter.is_highlighted(walls, 42));

    let hit = h.click_element(walls, 43).unwrap();
    assert_eq!(hit.id, 43);

    // Reinforcement is excluded by the configured loader
    assert!(h.ray_to_element("Duplex_A_20110907-ifcreinforcingbar", 99).is_none());
}

#[test]
fn test_harness_load_ply_places_points_and_gizmo() {
    let mut h = TestHarness::new();
    let nodes = h.load_ply(DUPLEX_PLY).unwrap();

    let points = h.state.scene.get(&nodes.points).unwrap();
    assert_eq!(
        points.transform.position,
        [-8.331974467885479, -2.588762760779156, -11.952101154993713]
    );
    assert_eq!(points.transform.rotation, POINT_CLOUD_ROTATION);
    assert_abs_diff_eq!(points.transform.rotation[0], -std::f64::consts::FRAC_PI_2);

    let control = h.state.scene.transform_control(&nodes.control).unwrap();
    assert_eq!(control.size, TRANSFORM_CONTROL_SIZE);
    assert_eq!(control.attached(), Some(&nodes.points));

    let labels = h.panel_labels();
    assert_eq!(
        labels,
        vec!["load BIM", "load PLY", "show ply control", "show ply"]
    );
    assert_eq!(h.toggle_value("show ply"), Some(true));
    assert_eq!(h.toggle_value("show ply control"), Some(true));
    assert_eq!(h.point_cloud_count(), 1);
}

#[test]
fn test_harness_pick_overwrites_prior_selection() {
    let mut h = TestHarness::new();
    h.load_bim(DUPLEX_FRAG).unwrap();

    h.state
        .selection
        .replace([("F9".to_string(), vec![1, 2, 3])].into());

    let hit = h.click_element("F1", 42).unwrap();
    assert_eq!(hit.id, 42);
    assert_eq!(hit.fragments, vec!["F1".to_string()]);

    let record = h.selection().unwrap();
    assert_eq!(record.len(), 1);
    assert_eq!(record["F1"], vec![42]);
    assert!(h.state.highlighter.is_highlighted("F1", 42));
}

#[test]
fn test_harness_same_asset_twice_keeps_selections_apart() {
    let mut h = TestHarness::new();
    h.load_bim(DUPLEX_FRAG).unwrap();
    let second = h.load_bim(DUPLEX_FRAG).unwrap();

    // Move the copy aside so the two models do not overlap
    h.state.scene.get_mut(&second).unwrap().transform.position = [100.0, 0.0, 0.0];
    h.state.highlighter.update(&h.state.scene);

    let hit = h.click_element("F1#2", 42).unwrap();
    assert_eq!(hit.fragments, vec!["F1#2".to_string()]);
    assert!(h.state.highlighter.is_highlighted("F1#2", 42));
    assert!(!h.state.highlighter.is_highlighted("F1", 42));
    assert!(h.selection().unwrap().get("F1").is_none());

    let hit = h.click_element("F1", 42).unwrap();
    assert_eq!(hit.fragments, vec!["F1".to_string()]);
    assert!(!h.state.highlighter.is_highlighted("F1#2", 42));
}

#[test]
fn test_harness_pick_element_in_several_fragments() {
    let mut h = TestHarness::new();
    h.load_bim(DUPLEX_FRAG).unwrap();

    let hit = h.click_element("F2", 7).unwrap();
    assert_eq!(hit.id, 7);
    assert_eq!(hit.fragments, vec!["F2".to_string(), "F4".to_string()]);

    let record = h.selection().unwrap();
    assert_eq!(record["F2"], vec![7]);
    assert_eq!(record["F4"], vec![7]);

    // Second pick replaces the whole record
    h.click_element("F1", 42).unwrap();
    assert!(h.selection().unwrap().get("F2").is_none());
}

#[test]
fn test_harness_miss_keeps_selection_but_clears_highlight() {
    let mut h = TestHarness::new();
    h.load_bim(DUPLEX_FRAG).unwrap();
    h.click_element("F1", 42).unwrap();

    let away = bimview_gui_lib::viewport::picking::Ray::new(
        glam::Vec3::new(1000.0, 1000.0, 1000.0),
        glam::Vec3::Y,
    );
    assert!(h.click(&away).is_none());

    assert_eq!(h.selection().unwrap()["F1"], vec![42]);
    assert!(!h.state.highlighter.is_highlighted("F1", 42));
}

#[test]
fn test_harness_hidden_model_is_not_pickable() {
    let mut h = TestHarness::new();
    h.load_bim(DUPLEX_FRAG).unwrap();
    let ray = h.ray_to_element("F1", 42).unwrap();

    assert_eq!(h.set_toggle("show bim", false), Some(false));
    assert!(h.click(&ray).is_none());

    h.set_toggle("show bim", true);
    assert_eq!(h.click(&ray).map(|r| r.id), Some(42));
}

#[test]
fn test_harness_drag_disables_camera_until_end() {
    let mut h = TestHarness::new();
    let nodes = h.load_ply(DUPLEX_PLY).unwrap();
    assert!(h.camera_enabled());

    assert!(h.begin_drag(&nodes.control, GizmoAxis::X));
    assert!(!h.camera_enabled());
    for _ in 0..5 {
        assert!(h.drag(&nodes.control, 0.25));
        assert!(!h.camera_enabled());
    }
    assert!(h.end_drag(&nodes.control));
    assert!(h.camera_enabled());

    let position = h.state.scene.get(&nodes.points).unwrap().transform.position;
    assert_abs_diff_eq!(position[0], -8.331974467885479 + 1.25, epsilon = 1e-6);
}

#[test]
fn test_harness_dispose_empties_export() {
    let mut h = TestHarness::new();
    h.load_bim(DUPLEX_FRAG).unwrap();
    h.click_element("F1", 42).unwrap();

    assert!(!h.export().unwrap().is_empty());
    assert_eq!(h.dispose(), 1);
    assert_eq!(h.model_count(), 0);
    assert!(h.selection().is_none());
    let bundle: shared::FragmentsBundle = serde_json::from_slice(&h.export().unwrap()).unwrap();
    assert!(bundle.models.is_empty());
}

#[test]
fn test_harness_failed_load_leaves_scene_untouched() {
    let mut source = fixtures::duplex_assets();
    source.remove(DUPLEX_PLY);
    let mut h = TestHarness::with_source(source);
    let before = h.node_count();

    assert!(h.load_ply(DUPLEX_PLY).is_err());
    assert_eq!(h.node_count(), before);
    assert_eq!(h.panel_labels(), vec!["load BIM", "load PLY"]);
    assert!(!h.state.loads.any());
}
