use egui::Ui;

use crate::state::loads::LoadKind;
use crate::state::AppState;

pub fn show(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui| {
        let models = state.scene.model_ids().len();
        ui.weak(format!("Nodes: {}", state.scene.len()));
        ui.weak(format!("Models: {models}"));

        ui.separator();

        for kind in [LoadKind::Bim, LoadKind::PointCloud] {
            if state.loads.is_loading(kind) {
                ui.colored_label(
                    egui::Color32::from_rgb(255, 200, 100),
                    format!("Loading {kind}…"),
                );
                ui.separator();
            }
        }

        match &state.status {
            Some(status) if status.is_error => {
                ui.colored_label(egui::Color32::from_rgb(240, 90, 90), &status.text);
            }
            Some(status) => {
                ui.label(&status.text);
            }
            None if state.selection.is_empty() => {
                ui.weak("Ready");
            }
            None => {
                ui.label("Element selected");
            }
        }

        // Right-aligned version
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(concat!("bimview v", env!("CARGO_PKG_VERSION")));
        });
    });
}
