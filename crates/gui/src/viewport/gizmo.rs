use glam::Vec3;

use super::camera::ArcBallCamera;
use super::mesh::LineMeshData;
use crate::transform::GizmoAxis;

/// World length of a gizmo axis. The gizmo keeps roughly the same screen
/// size, so the length follows the camera distance.
pub fn axis_length(camera: &ArcBallCamera, size: f32) -> f32 {
    camera.distance * size * 0.25
}

/// Compute the world-space translation delta for a gizmo drag.
/// Projects the screen-space drag delta along the axis direction in screen space.
pub fn compute_drag_delta(
    camera: &ArcBallCamera,
    center: Vec3,
    axis: GizmoAxis,
    screen_delta: egui::Vec2,
    rect: egui::Rect,
) -> Vec3 {
    let axis_dir = axis.direction();

    let p0 = camera.project(center.to_array(), rect);
    let p1 = camera.project((center + axis_dir).to_array(), rect);

    let (Some(screen_p0), Some(screen_p1)) = (p0, p1) else {
        return Vec3::ZERO;
    };

    let screen_axis = egui::vec2(screen_p1.x - screen_p0.x, screen_p1.y - screen_p0.y);
    let screen_axis_len = screen_axis.length();

    if screen_axis_len < 1.0 {
        return Vec3::ZERO;
    }

    let projected = screen_delta.dot(screen_axis / screen_axis_len);

    // 1 world unit = screen_axis_len pixels
    axis_dir * (projected / screen_axis_len)
}

/// Gizmo line mesh at the given center point. The active axis is drawn brighter.
pub fn build_gizmo_lines(center: Vec3, length: f32, active: Option<GizmoAxis>) -> LineMeshData {
    let mut vertices = Vec::new();
    let arrow = length * 0.15;

    for axis in GizmoAxis::ALL {
        let color = axis_color(axis, active == Some(axis));
        let dir = axis.direction();
        // Any vector perpendicular to the axis for the arrowhead
        let side = if axis == GizmoAxis::Y { Vec3::X } else { Vec3::Y };
        let tip = center + dir * length;

        push_segment(&mut vertices, center, tip, color);
        push_segment(&mut vertices, tip, tip - dir * arrow + side * arrow * 0.5, color);
        push_segment(&mut vertices, tip, tip - dir * arrow - side * arrow * 0.5, color);
    }

    LineMeshData { vertices }
}

fn axis_color(axis: GizmoAxis, active: bool) -> [f32; 4] {
    let boost = if active { 0.1 } else { 0.0 };
    match axis {
        GizmoAxis::X => [0.9, 0.2 + boost, 0.2 + boost, 1.0],
        GizmoAxis::Y => [0.2 + boost, 0.8 + boost, 0.2 + boost, 1.0],
        GizmoAxis::Z => [0.2 + boost, 0.3 + boost, 0.9, 1.0],
    }
}

fn push_segment(v: &mut Vec<f32>, a: Vec3, b: Vec3, c: [f32; 4]) {
    v.extend_from_slice(&[a.x, a.y, a.z, c[0], c[1], c[2], c[3]]);
    v.extend_from_slice(&[b.x, b.y, b.z, c[0], c[1], c[2], c[3]]);
}
