//! 3D viewport panel

mod camera;
mod gizmo;
pub use bimview_gui_lib::viewport::{mesh, picking};
mod renderer;

use egui::Ui;
use glam::Vec3;
use shared::NodeId;
use tokio::runtime::Runtime;

use crate::state::AppState;
use bimview_gui_lib::transform::{hit_test_axis, translate_attached};
use camera::ArcBallCamera;
use gizmo::{axis_length, build_gizmo_lines, compute_drag_delta};

/// 3D viewport panel
pub struct ViewportPanel {
    camera: ArcBallCamera,
    /// Transform control being dragged
    drag_control: Option<NodeId>,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            camera: ArcBallCamera::new(),
            drag_control: None,
        }
    }

    pub fn reset_camera(&mut self) {
        self.camera = ArcBallCamera::new();
    }

    /// Fit the camera to everything visible
    pub fn frame_scene(&mut self, state: &AppState) {
        if let Some(bounds) = state.scene.bounds() {
            self.camera.frame_bounds(&bounds);
        }
    }

    pub fn show(&mut self, ui: &mut Ui, state: &mut AppState, runtime: &Runtime) {
        let (rect, response) = ui.allocate_exact_size(
            ui.available_size(),
            egui::Sense::click_and_drag(),
        );

        // ── Gizmo and camera controls ─────────────────────────────
        self.handle_gizmo_and_camera(&response, ui, rect, state);

        // ── Element selection via click ──────────────────────────
        self.handle_selection(&response, ui, rect, state, runtime);

        if !ui.is_rect_visible(rect) {
            return;
        }

        renderer::paint_viewport(ui, rect, &self.camera, state);
        self.draw_gizmo(ui, rect, state);
        self.draw_overlays(ui, rect, state);
    }

    /// Center of the node the gizmo is attached to
    fn gizmo_center(state: &AppState, control: &str) -> Option<Vec3> {
        let target = state.scene.transform_control(control)?.attached()?;
        let p = state.scene.get(target)?.transform.position;
        Some(Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32))
    }

    fn handle_gizmo_and_camera(
        &mut self,
        response: &egui::Response,
        ui: &Ui,
        rect: egui::Rect,
        state: &mut AppState,
    ) {
        // ── Gizmo drag handling ─────────────────────────────────
        if let Some(control) = self.drag_control.clone() {
            if response.dragged_by(egui::PointerButton::Primary) {
                let axis = state.scene.transform_control(&control).and_then(|c| c.active_axis);
                if let (Some(axis), Some(center)) = (axis, Self::gizmo_center(state, &control)) {
                    let delta = compute_drag_delta(&self.camera, center, axis, response.drag_delta(), rect);
                    translate_attached(&mut state.scene, &control, delta);
                }
            }
            // End drag when button released
            if response.drag_stopped() || !response.dragged_by(egui::PointerButton::Primary) {
                if let Some(gizmo) = state.scene.transform_control_mut(&control) {
                    gizmo.end_drag(&mut state.camera_controls);
                }
                self.drag_control = None;
            }
            return;
        }

        // ── Gizmo drag start on LMB drag ───────────────────
        if response.drag_started_by(egui::PointerButton::Primary) && !ui.input(|i| i.modifiers.alt) {
            if let Some(pos) = response.interact_pointer_pos().or_else(|| response.hover_pos()) {
                let ray = self.camera.screen_ray(pos, rect);
                let hit = state.scene.active_transform_control().and_then(|(node, control)| {
                    let center = Self::gizmo_center(state, &node.id)?;
                    let axis = hit_test_axis(&ray, center, axis_length(&self.camera, control.size))?;
                    Some((node.id.clone(), axis))
                });
                if let Some((id, axis)) = hit {
                    if let Some(gizmo) = state.scene.transform_control_mut(&id) {
                        gizmo.begin_drag(axis, &mut state.camera_controls);
                        self.drag_control = Some(id);
                        return;
                    }
                }
            }
        }

        // ── Camera controls (only while enabled) ──
        if !state.camera_controls.enabled() {
            return;
        }
        if response.dragged_by(egui::PointerButton::Middle)
            || (response.dragged_by(egui::PointerButton::Primary) && !ui.input(|i| i.modifiers.shift))
        {
            let delta = response.drag_delta();
            self.camera.rotate(delta.x * 0.5, delta.y * 0.5);
        }

        if response.dragged_by(egui::PointerButton::Secondary)
            || (response.dragged_by(egui::PointerButton::Primary) && ui.input(|i| i.modifiers.shift))
        {
            let delta = response.drag_delta();
            self.camera.pan(-delta.x * 0.01, delta.y * 0.01);
        }

        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if response.hovered() && scroll.abs() > 0.1 {
            self.camera.zoom(scroll * 0.01);
        }
    }

    fn handle_selection(
        &mut self,
        response: &egui::Response,
        ui: &Ui,
        rect: egui::Rect,
        state: &mut AppState,
        runtime: &Runtime,
    ) {
        if !response.clicked() || ui.input(|i| i.modifiers.alt) || self.drag_control.is_some() {
            return;
        }
        let Some(pos) = response.interact_pointer_pos() else {
            return;
        };

        let ray = self.camera.screen_ray(pos, rect);
        let state = &mut *state;
        let hit = runtime.block_on(state.selection_controller.on_viewport_click(
            &mut state.highlighter,
            &ray,
            &mut state.selection,
        ));
        match hit {
            Some(result) => state.set_status(format!(
                "Element #{} in {} fragment(s)",
                result.id,
                result.fragments.len()
            )),
            None => state.status = None,
        }
    }

    fn draw_gizmo(&self, ui: &Ui, rect: egui::Rect, state: &AppState) {
        let Some((node, control)) = state.scene.active_transform_control() else {
            return;
        };
        let Some(center) = Self::gizmo_center(state, &node.id) else {
            return;
        };
        let lines = build_gizmo_lines(center, axis_length(&self.camera, control.size), control.active_axis);
        renderer::draw_lines(&ui.painter_at(rect), rect, &self.camera, &lines, 2.0);
    }

    fn draw_overlays(&self, ui: &Ui, rect: egui::Rect, state: &AppState) {
        let painter = ui.painter_at(rect);

        self.draw_camera_info(&painter, rect);

        // Navigation hint
        if state.scene.bounds().is_none() {
            painter.text(
                egui::pos2(rect.center().x, rect.bottom() - 20.0),
                egui::Align2::CENTER_BOTTOM,
                "Drag to orbit · Shift+drag or right-drag to pan · Scroll to zoom · F to frame",
                egui::FontId::proportional(11.0),
                egui::Color32::from_rgb(100, 100, 110),
            );
        }
    }

    fn draw_camera_info(&self, painter: &egui::Painter, rect: egui::Rect) {
        let overlay_rect = egui::Rect::from_min_size(
            egui::pos2(rect.right() - 140.0, rect.top() + 4.0),
            egui::vec2(136.0, 44.0),
        );
        painter.rect_filled(
            overlay_rect,
            4.0,
            egui::Color32::from_rgba_premultiplied(0, 0, 0, 140),
        );
        painter.text(
            overlay_rect.min + egui::vec2(6.0, 4.0),
            egui::Align2::LEFT_TOP,
            format!(
                "Dist: {:.1}\nYaw: {:.0}  Pitch: {:.0}",
                self.camera.distance,
                self.camera.yaw.to_degrees(),
                self.camera.pitch.to_degrees(),
            ),
            egui::FontId::monospace(10.0),
            egui::Color32::from_rgb(160, 160, 170),
        );
    }
}
