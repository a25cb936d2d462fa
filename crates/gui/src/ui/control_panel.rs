//! Left side panel: load buttons and visibility toggles

use egui::Ui;

use crate::state::loads::LoadKind;
use crate::state::panel::{EntryKind, PanelAction};
use crate::state::AppState;

fn load_kind(action: PanelAction) -> LoadKind {
    match action {
        PanelAction::LoadBim => LoadKind::Bim,
        PanelAction::LoadPly => LoadKind::PointCloud,
    }
}

/// Draw the panel; returns the load action the user clicked, if any
pub fn show(ui: &mut Ui, state: &mut AppState) -> Option<PanelAction> {
    ui.heading("Controls");
    ui.separator();

    let mut clicked = None;
    let mut toggled = Vec::new();

    for entry in state.panel.entries() {
        match &entry.kind {
            EntryKind::Action(action) => {
                let busy = state.loads.is_loading(load_kind(*action));
                ui.horizontal(|ui| {
                    let button = egui::Button::new(&entry.label).min_size(egui::vec2(120.0, 0.0));
                    if ui.add_enabled(!busy, button).clicked() {
                        clicked = Some(*action);
                    }
                    if busy {
                        ui.spinner();
                    }
                });
            }
            EntryKind::Toggle(node) => {
                let mut visible = state.scene.is_visible(node);
                if ui.checkbox(&mut visible, &entry.label).changed() {
                    toggled.push((node.clone(), visible));
                }
            }
        }
    }

    for (node, visible) in toggled {
        state.set_visible(&node, visible);
    }

    if state.panel.toggles().next().is_none() {
        ui.add_space(10.0);
        ui.weak("Nothing loaded yet");
    }

    clicked
}
