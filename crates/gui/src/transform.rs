//! Transform gizmo state and its link to camera navigation.
//!
//! While a gizmo drag is in progress the camera controls are disabled, so the
//! pointer drives exactly one of the two.

use std::f64::consts::FRAC_PI_2;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::NodeId;

use crate::state::scene::SceneState;
use crate::viewport::picking::Ray;

/// Gizmo handle size
pub const TRANSFORM_CONTROL_SIZE: f32 = 0.5;
/// Point size of the point-cloud material
pub const POINT_SIZE: f32 = 0.1;
/// Point clouds are Z-up; the scene is Y-up
pub const POINT_CLOUD_ROTATION: [f64; 3] = [-FRAC_PI_2, 0.0, 0.0];
/// Pick distance to a gizmo axis, as a fraction of its length
const AXIS_PICK_TOLERANCE: f32 = 0.1;

/// Camera orbit/pan/zoom switch
#[derive(Debug, Clone, PartialEq)]
pub struct CameraControls {
    enabled: bool,
}

impl Default for CameraControls {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl CameraControls {
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

/// Which axis a gizmo handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GizmoAxis {
    X,
    Y,
    Z,
}

impl GizmoAxis {
    pub const ALL: [GizmoAxis; 3] = [GizmoAxis::X, GizmoAxis::Y, GizmoAxis::Z];

    pub fn direction(self) -> Vec3 {
        match self {
            GizmoAxis::X => Vec3::X,
            GizmoAxis::Y => Vec3::Y,
            GizmoAxis::Z => Vec3::Z,
        }
    }
}

/// Translation gizmo attached to at most one node
#[derive(Debug, Clone, PartialEq)]
pub struct TransformControl {
    attached: Option<NodeId>,
    pub size: f32,
    dragging: bool,
    /// Currently dragged axis
    pub active_axis: Option<GizmoAxis>,
}

impl TransformControl {
    pub fn new(size: f32) -> Self {
        Self {
            attached: None,
            size,
            dragging: false,
            active_axis: None,
        }
    }

    /// Attach to `node`, replacing any previous attachment
    pub fn attach(&mut self, node: NodeId) {
        self.attached = Some(node);
    }

    pub fn detach(&mut self) {
        self.attached = None;
    }

    pub fn attached(&self) -> Option<&NodeId> {
        self.attached.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Dragging and camera navigation are mutually exclusive
    pub fn set_dragging(&mut self, dragging: bool, controls: &mut CameraControls) {
        self.dragging = dragging;
        controls.enabled = !dragging;
        tracing::debug!("Gizmo dragging = {dragging}");
    }

    pub fn begin_drag(&mut self, axis: GizmoAxis, controls: &mut CameraControls) {
        self.active_axis = Some(axis);
        self.set_dragging(true, controls);
    }

    pub fn end_drag(&mut self, controls: &mut CameraControls) {
        self.active_axis = None;
        self.set_dragging(false, controls);
    }
}

/// Find the gizmo axis under a ray. `length` is the world length of each axis.
pub fn hit_test_axis(ray: &Ray, center: Vec3, length: f32) -> Option<GizmoAxis> {
    let threshold = length * AXIS_PICK_TOLERANCE;
    GizmoAxis::ALL
        .into_iter()
        .map(|axis| {
            let dist = ray_segment_distance(ray, center, center + axis.direction() * length);
            (axis, dist)
        })
        .filter(|(_, dist)| *dist < threshold)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(axis, _)| axis)
}

/// Move the node attached to gizmo `control_id` by `delta`.
/// Returns false if the gizmo or its target is missing.
pub fn translate_attached(scene: &mut SceneState, control_id: &str, delta: Vec3) -> bool {
    let Some(target) = scene
        .transform_control(control_id)
        .and_then(|c| c.attached().cloned())
    else {
        return false;
    };
    let Some(node) = scene.get_mut(&target) else {
        return false;
    };
    node.transform.position[0] += delta.x as f64;
    node.transform.position[1] += delta.y as f64;
    node.transform.position[2] += delta.z as f64;
    true
}

/// Minimum distance between a ray and a line segment.
fn ray_segment_distance(ray: &Ray, start: Vec3, end: Vec3) -> f32 {
    let u = ray.direction;
    let v = end - start;
    let w = ray.origin - start;

    let a = u.dot(u);
    let b = u.dot(v);
    let c = v.dot(v);
    let d = u.dot(w);
    let e = v.dot(w);

    let denom = a * c - b * b;

    let (sc, tc) = if denom < 1e-7 {
        // Nearly parallel
        (0.0, if b > c { d / b } else { e / c })
    } else {
        ((b * e - c * d) / denom, (a * e - b * d) / denom)
    };

    let tc = tc.clamp(0.0, 1.0);
    let sc = sc.max(0.0);

    ((ray.origin + u * sc) - (start + v * tc)).length()
}
