//! Headless test harness.
//!
//! Drives the load and selection workflow against an in-memory asset source,
//! without a window or a GPU.

use glam::Vec3;
use shared::{AssetRef, HighlightResult, NodeId};

use crate::assets::MemoryAssetSource;
use crate::error::Result;
use crate::fixtures;
use crate::loaders::BimLoader;
use crate::orchestrator::{dispose_models, export_fragments, LoadOrchestrator, PointCloudNodes};
use crate::state::scene::NodeKind;
use crate::state::selection::SelectionRecord;
use crate::state::AppState;
use crate::transform::{translate_attached, GizmoAxis};
use crate::viewport::mesh::node_matrix;
use crate::viewport::picking::{Aabb, Ray};

/// Headless harness: app state, an orchestrator and a current-thread runtime
pub struct TestHarness {
    pub state: AppState,
    orchestrator: LoadOrchestrator<MemoryAssetSource, BimLoader>,
    runtime: tokio::runtime::Runtime,
}

impl TestHarness {
    /// Harness serving the Duplex sample assets
    pub fn new() -> Self {
        Self::with_source(fixtures::duplex_assets())
    }

    pub fn with_source(source: MemoryAssetSource) -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build harness runtime");
        Self {
            state: AppState::default(),
            orchestrator: LoadOrchestrator::new(source, BimLoader),
            runtime,
        }
    }

    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    // ── Loading ───────────────────────────────────────────────

    /// Load a BIM asset (IFC or fragments), named after the file stem
    pub fn load_bim(&mut self, path: &str) -> Result<NodeId> {
        let asset = AssetRef::infer(path)
            .unwrap_or_else(|| AssetRef::new(path, shared::AssetFormat::Ifc));
        let name = asset.stem().to_string();
        self.runtime
            .block_on(self.orchestrator.load_model(&mut self.state, &asset, &name))
    }

    pub fn load_ply(&mut self, path: &str) -> Result<PointCloudNodes> {
        let asset = AssetRef::new(path, shared::AssetFormat::Ply);
        self.runtime
            .block_on(self.orchestrator.load_point_cloud(&mut self.state, &asset))
    }

    pub fn export(&self) -> Result<Vec<u8>> {
        export_fragments(&self.state)
    }

    pub fn dispose(&mut self) -> usize {
        dispose_models(&mut self.state)
    }

    // ── Picking ───────────────────────────────────────────────

    /// Run the selection controller for a click along `ray`
    pub fn click(&mut self, ray: &Ray) -> Option<HighlightResult> {
        let state = &mut self.state;
        self.runtime.block_on(state.selection_controller.on_viewport_click(
            &mut state.highlighter,
            ray,
            &mut state.selection,
        ))
    }

    /// Ray looking down -Z at the center of an element's world bounds
    pub fn ray_to_element(&self, fragment: &str, express_id: u32) -> Option<Ray> {
        let (node, model) = self
            .state
            .scene
            .models()
            .find(|(_, m)| m.fragment(fragment).is_some())?;
        let element = model
            .fragment(fragment)?
            .elements
            .iter()
            .find(|e| e.express_id == express_id)?;
        let bounds = Aabb::from_positions(&element.positions)?.transformed(&node_matrix(&node.transform));
        let center = bounds.center();
        Some(Ray::new(
            Vec3::new(center.x, center.y, bounds.max.z + 50.0),
            Vec3::NEG_Z,
        ))
    }

    pub fn click_element(&mut self, fragment: &str, express_id: u32) -> Option<HighlightResult> {
        let ray = self.ray_to_element(fragment, express_id)?;
        self.click(&ray)
    }

    pub fn selection(&self) -> Option<&SelectionRecord> {
        self.state.selection.record()
    }

    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
    }

    // ── Gizmo ─────────────────────────────────────────────────

    /// Start dragging `axis` of the transform control `control`
    pub fn begin_drag(&mut self, control: &str, axis: GizmoAxis) -> bool {
        let state = &mut self.state;
        match state.scene.transform_control_mut(control) {
            Some(gizmo) => {
                gizmo.begin_drag(axis, &mut state.camera_controls);
                true
            }
            None => false,
        }
    }

    /// Move the attached node along the active axis
    pub fn drag(&mut self, control: &str, amount: f32) -> bool {
        let Some(axis) = self
            .state
            .scene
            .transform_control(control)
            .and_then(|g| g.active_axis)
        else {
            return false;
        };
        translate_attached(&mut self.state.scene, control, axis.direction() * amount)
    }

    pub fn end_drag(&mut self, control: &str) -> bool {
        let state = &mut self.state;
        match state.scene.transform_control_mut(control) {
            Some(gizmo) => {
                gizmo.end_drag(&mut state.camera_controls);
                true
            }
            None => false,
        }
    }

    pub fn camera_enabled(&self) -> bool {
        self.state.camera_controls.enabled()
    }

    // ── Panel and scene queries ───────────────────────────────

    pub fn panel_labels(&self) -> Vec<String> {
        self.state
            .panel
            .labels()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Visibility bound to the panel toggle `label`
    pub fn toggle_value(&self, label: &str) -> Option<bool> {
        let node = self.state.panel.toggle_target(label)?;
        Some(self.state.scene.is_visible(node))
    }

    /// Flip a panel toggle. Returns the new value.
    pub fn set_toggle(&mut self, label: &str, visible: bool) -> Option<bool> {
        let node = self.state.panel.toggle_target(label)?.clone();
        self.state.set_visible(&node, visible);
        Some(visible)
    }

    pub fn node_count(&self) -> usize {
        self.state.scene.len()
    }

    pub fn model_count(&self) -> usize {
        self.state.scene.model_ids().len()
    }

    pub fn point_cloud_count(&self) -> usize {
        self.state
            .scene
            .nodes()
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Points { .. }))
            .count()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
