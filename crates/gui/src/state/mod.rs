pub mod loads;
pub mod panel;
pub mod scene;
pub mod selection;
pub mod settings;

pub use loads::{LoadKind, LoadTracker};
pub use panel::{ControlPanel, PanelAction};
pub use scene::{NodeKind, SceneNode, SceneState};
pub use selection::{SelectionRecord, SelectionState};
pub use settings::AppSettings;

use crate::highlight::{FragmentHighlighter, SelectionController};
use crate::transform::CameraControls;

/// One line of feedback for the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Combined application state
pub struct AppState {
    pub scene: SceneState,
    pub selection: SelectionState,
    pub selection_controller: SelectionController,
    pub highlighter: FragmentHighlighter,
    pub panel: ControlPanel,
    pub camera_controls: CameraControls,
    pub loads: LoadTracker,
    pub settings: AppSettings,
    pub status: Option<StatusMessage>,
    /// Show settings window
    pub show_settings_window: bool,
}

impl AppState {
    /// Fresh state: default lights, the two load actions and the "default" highlight style
    pub fn new(settings: AppSettings) -> Self {
        let mut scene = SceneState::default();
        scene.setup();
        Self {
            scene,
            selection: SelectionState::default(),
            selection_controller: SelectionController::default(),
            highlighter: FragmentHighlighter::new(),
            panel: ControlPanel::with_load_actions(),
            camera_controls: CameraControls::default(),
            loads: LoadTracker::default(),
            settings,
            status: None,
            show_settings_window: false,
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    /// Set node visibility and keep the pick index in sync
    pub fn set_visible(&mut self, node: &str, visible: bool) -> bool {
        if !self.scene.set_visible(node, visible) {
            return false;
        }
        if matches!(self.scene.get(node).map(|n| &n.kind), Some(NodeKind::Model(_))) {
            self.highlighter.update(&self.scene);
        }
        true
    }

    /// Drop the highlight and the selection record
    pub fn clear_selection(&mut self) {
        self.highlighter.clear(None);
        self.selection.clear();
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppSettings::default())
    }
}
