//! JSON command protocol for scripted sessions.
//!
//! Commands run against the headless [`TestHarness`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::harness::TestHarness;
use crate::state::scene::NodeKind;
use crate::transform::GizmoAxis;
use crate::viewport::picking::Ray;

/// A command a script can execute.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Load a BIM model (IFC or fragments). Defaults to the configured asset.
    LoadBim {
        #[serde(default)]
        path: Option<String>,
    },
    /// Load a point cloud. Defaults to the configured asset.
    LoadPly {
        #[serde(default)]
        path: Option<String>,
    },
    /// Click along a world-space ray
    Pick {
        origin: [f32; 3],
        direction: [f32; 3],
    },
    /// Click on the center of an element
    PickElement {
        fragment: String,
        express_id: u32,
    },
    /// Set a panel toggle
    SetVisible {
        label: String,
        visible: bool,
    },
    /// Drag the gizmo bound to the "show ply control" toggle along an axis
    DragGizmo {
        axis: GizmoAxis,
        amount: f32,
    },
    ClearSelection,
    /// Inspect the scene, panel and selection
    Inspect,
    /// Export loaded models as a fragments bundle
    ExportFragments,
    /// Remove all loaded models
    Dispose,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: AgentCommand) -> CommandResponse {
    match cmd {
        AgentCommand::LoadBim { path } => {
            let path = path.unwrap_or_else(|| harness.state.settings.assets.bim_path.clone());
            match harness.load_bim(&path) {
                Ok(id) => CommandResponse::ok_with_data(serde_json::json!({ "id": id })),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        AgentCommand::LoadPly { path } => {
            let path = path.unwrap_or_else(|| harness.state.settings.assets.ply_path.clone());
            match harness.load_ply(&path) {
                Ok(nodes) => CommandResponse::ok_with_data(serde_json::json!({
                    "points": nodes.points,
                    "control": nodes.control,
                })),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        AgentCommand::Pick { origin, direction } => {
            let ray = Ray::new(Vec3::from(origin), Vec3::from(direction).normalize_or_zero());
            pick_response(harness.click(&ray))
        }

        AgentCommand::PickElement {
            fragment,
            express_id,
        } => match harness.ray_to_element(&fragment, express_id) {
            Some(ray) => pick_response(harness.click(&ray)),
            None => CommandResponse::err(format!("no element {express_id} in fragment {fragment}")),
        },

        AgentCommand::SetVisible { label, visible } => match harness.set_toggle(&label, visible) {
            Some(v) => CommandResponse::ok_with_data(serde_json::json!({ "visible": v })),
            None => CommandResponse::err(format!("no toggle named '{label}'")),
        },

        AgentCommand::DragGizmo { axis, amount } => {
            let Some(control) = harness
                .state
                .panel
                .toggle_target(crate::state::panel::SHOW_PLY_CONTROL)
                .cloned()
            else {
                return CommandResponse::err("no transform control loaded");
            };
            harness.begin_drag(&control, axis);
            let camera_during = harness.camera_enabled();
            let moved = harness.drag(&control, amount);
            harness.end_drag(&control);
            CommandResponse::ok_with_data(serde_json::json!({
                "moved": moved,
                "camera_enabled_during_drag": camera_during,
                "camera_enabled": harness.camera_enabled(),
            }))
        }

        AgentCommand::ClearSelection => {
            harness.clear_selection();
            CommandResponse::ok()
        }

        AgentCommand::Inspect => {
            let nodes: Vec<serde_json::Value> = harness
                .state
                .scene
                .nodes()
                .iter()
                .map(|node| {
                    let mut value = serde_json::json!({
                        "id": node.id,
                        "name": node.name,
                        "kind": node.kind.label(),
                        "visible": node.visible,
                        "position": node.transform.position,
                    });
                    match &node.kind {
                        NodeKind::Model(model) => {
                            value["fragments"] = serde_json::json!(model.fragments.len());
                        }
                        NodeKind::Points { cloud, .. } => {
                            value["points"] = serde_json::json!(cloud.len());
                        }
                        _ => {}
                    }
                    value
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "node_count": nodes.len(),
                "nodes": nodes,
                "panel": harness.panel_labels(),
                "selection": harness.selection(),
                "camera_enabled": harness.camera_enabled(),
            }))
        }

        AgentCommand::ExportFragments => match harness.export() {
            Ok(bytes) => CommandResponse::ok_with_data(serde_json::json!({
                "fragments_json": String::from_utf8_lossy(&bytes),
            })),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        AgentCommand::Dispose => {
            let removed = harness.dispose();
            CommandResponse::ok_with_data(serde_json::json!({ "removed": removed }))
        }
    }
}

fn pick_response(result: Option<shared::HighlightResult>) -> CommandResponse {
    match result {
        Some(hit) => CommandResponse::ok_with_data(serde_json::json!({
            "hit": true,
            "id": hit.id,
            "fragments": hit.fragments,
        })),
        None => CommandResponse::ok_with_data(serde_json::json!({ "hit": false })),
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: AgentCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<AgentCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
