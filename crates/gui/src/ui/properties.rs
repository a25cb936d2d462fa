//! Properties panel for the current selection and loaded models

use egui::Ui;
use shared::{FragmentId, LoadedModel};

use crate::state::AppState;

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Selection");
    ui.separator();

    match state.selection.record() {
        Some(record) => {
            egui::Grid::new("selection_props")
                .num_columns(2)
                .spacing([8.0, 4.0])
                .striped(true)
                .show(ui, |ui| {
                    for (fragment, ids) in record {
                        ui.monospace(short_id(fragment));
                        let ids: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
                        ui.label(ids.join(", "));
                        ui.label("");
                        ui.weak(fragment_type(state, fragment).unwrap_or("?"));
                        ui.end_row();
                    }
                });
            ui.add_space(4.0);
            if ui.button("Clear selection").clicked() {
                state.clear_selection();
            }
        }
        None => {
            ui.add_space(10.0);
            ui.vertical_centered(|ui| {
                ui.weak("Click an element");
                ui.weak("to select it");
            });
        }
    }

    ui.add_space(12.0);
    ui.heading("Models");
    ui.separator();

    let mut any = false;
    for (node, model) in state.scene.models() {
        any = true;
        egui::CollapsingHeader::new(&node.name)
            .id_salt(&node.id)
            .default_open(true)
            .show(ui, |ui| show_model(ui, model, node.visible));
    }
    if !any {
        ui.weak("No models loaded");
    }
}

fn show_model(ui: &mut Ui, model: &LoadedModel, visible: bool) {
    egui::Grid::new(("model_props", model.name.as_str()))
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label("Schema:");
            ui.label(model.schema.as_deref().unwrap_or("unknown"));
            ui.end_row();

            ui.label("Visible:");
            ui.label(if visible { "Yes" } else { "No" });
            ui.end_row();

            ui.label("Fragments:");
            ui.label(model.fragments.len().to_string());
            ui.end_row();

            ui.label("Elements:");
            ui.label(model.element_count().to_string());
            ui.end_row();
        });
}

fn fragment_type<'a>(state: &'a AppState, fragment: &FragmentId) -> Option<&'a str> {
    state
        .scene
        .models()
        .find_map(|(_, model)| model.fragment(fragment))
        .map(|f| f.ifc_type.as_str())
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}
