//! Control panel entries

use shared::NodeId;

pub const LOAD_BIM: &str = "load BIM";
pub const LOAD_PLY: &str = "load PLY";
pub const SHOW_BIM: &str = "show bim";
pub const SHOW_PLY: &str = "show ply";
pub const SHOW_PLY_CONTROL: &str = "show ply control";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    LoadBim,
    LoadPly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Action(PanelAction),
    /// Checkbox bound to the visibility of a scene node
    Toggle(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelEntry {
    pub label: String,
    pub kind: EntryKind,
}

/// Ordered list of buttons and toggles shown in the side panel
#[derive(Debug, Default)]
pub struct ControlPanel {
    entries: Vec<PanelEntry>,
}

impl ControlPanel {
    /// Panel with the two load actions
    pub fn with_load_actions() -> Self {
        let mut panel = Self::default();
        panel.add_action(LOAD_BIM, PanelAction::LoadBim);
        panel.add_action(LOAD_PLY, PanelAction::LoadPly);
        panel
    }

    pub fn add_action(&mut self, label: &str, action: PanelAction) {
        self.entries.push(PanelEntry {
            label: label.to_string(),
            kind: EntryKind::Action(action),
        });
    }

    pub fn add_toggle(&mut self, label: &str, node: NodeId) {
        self.entries.push(PanelEntry {
            label: label.to_string(),
            kind: EntryKind::Toggle(node),
        });
    }

    /// Remove the toggles bound to `node`; returns how many were removed
    pub fn remove_toggles_for(&mut self, node: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| !matches!(&e.kind, EntryKind::Toggle(id) if id == node));
        before - self.entries.len()
    }

    pub fn entries(&self) -> &[PanelEntry] {
        &self.entries
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Node bound to the most recent toggle with this label
    pub fn toggle_target(&self, label: &str) -> Option<&NodeId> {
        self.entries.iter().rev().find_map(|e| match &e.kind {
            EntryKind::Toggle(id) if e.label == label => Some(id),
            _ => None,
        })
    }

    pub fn toggles(&self) -> impl Iterator<Item = (&str, &NodeId)> {
        self.entries.iter().filter_map(|e| match &e.kind {
            EntryKind::Toggle(id) => Some((e.label.as_str(), id)),
            _ => None,
        })
    }
}
