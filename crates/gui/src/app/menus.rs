//! Application menu bar and settings window

use eframe::egui;

use crate::orchestrator::{dispose_models, export_fragments};
use crate::state::AppState;
use crate::viewport::ViewportPanel;

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("File", |ui| {
        let has_models = !state.scene.model_ids().is_empty();

        if ui
            .add_enabled(has_models, egui::Button::new("Export fragments…"))
            .clicked()
        {
            ui.close_menu();
            export_to_file(state);
        }
        if ui
            .add_enabled(has_models, egui::Button::new("Dispose fragments"))
            .clicked()
        {
            let removed = dispose_models(state);
            state.set_status(format!("Disposed {removed} model(s)"));
            ui.close_menu();
        }
        ui.separator();
        if ui.button("Quit").clicked() {
            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

fn export_to_file(state: &mut AppState) {
    let bytes = match export_fragments(state) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to export fragments: {e}");
            state.set_error(format!("Export failed: {e}"));
            return;
        }
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export fragments")
        .add_filter("Fragments", &["frag", "json"])
        .set_file_name("fragments.frag")
        .save_file()
    else {
        return;
    };
    match std::fs::write(&path, bytes) {
        Ok(()) => {
            tracing::info!("Exported fragments to {}", path.display());
            state.set_status(format!("Exported to {}", path.display()));
        }
        Err(e) => {
            tracing::error!("Failed to write {}: {e}", path.display());
            state.set_error(format!("Export failed: {e}"));
        }
    }
}

/// Show the view menu
pub fn view_menu(ui: &mut egui::Ui, state: &mut AppState, viewport: &mut ViewportPanel) {
    ui.menu_button("View", |ui| {
        if ui.button("Frame scene (F)").clicked() {
            viewport.frame_scene(state);
            ui.close_menu();
        }
        if ui.button("Reset camera").clicked() {
            viewport.reset_camera();
            ui.close_menu();
        }
        ui.separator();
        if ui.button("Clear selection (Esc)").clicked() {
            state.clear_selection();
            ui.close_menu();
        }
    });
}

/// Show the settings menu
pub fn settings_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("Settings", |ui| {
        if ui.button("Preferences…").clicked() {
            state.show_settings_window = true;
            ui.close_menu();
        }
    });
}

pub fn settings_window(ctx: &egui::Context, state: &mut AppState) {
    let mut open = state.show_settings_window;
    egui::Window::new("Settings")
        .open(&mut open)
        .resizable(true)
        .default_width(400.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_asset_settings(ui, state);
                show_grid_settings(ui, state);
                show_axes_settings(ui, state);
                show_viewport_settings(ui, state);
                show_ui_settings(ui, state);
                show_settings_buttons(ui, state);
            });
        });
    state.show_settings_window = open;
}

fn show_asset_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Assets");
    let assets = &mut state.settings.assets;
    egui::Grid::new("asset_settings").num_columns(2).show(ui, |ui| {
        ui.label("Location");
        ui.text_edit_singleline(&mut assets.location);
        ui.end_row();
        ui.label("BIM file");
        ui.text_edit_singleline(&mut assets.bim_path);
        ui.end_row();
        ui.label("PLY file");
        ui.text_edit_singleline(&mut assets.ply_path);
        ui.end_row();
        ui.label("PLY offset");
        ui.horizontal(|ui| {
            for v in assets.ply_offset.iter_mut() {
                ui.add(egui::DragValue::new(v).speed(0.01).max_decimals(3));
            }
        });
        ui.end_row();
    });
    ui.small("Location changes apply on restart.");
    ui.add_space(10.0);
}

fn show_grid_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Grid");
    ui.checkbox(&mut state.settings.grid.visible, "Show grid");

    ui.horizontal(|ui| {
        ui.label("Cell size");
        ui.add(
            egui::DragValue::new(&mut state.settings.grid.size)
                .speed(0.1)
                .range(0.1..=100.0)
                .suffix(" m"),
        );
    });

    ui.horizontal(|ui| {
        ui.label("Lines");
        ui.add(
            egui::DragValue::new(&mut state.settings.grid.range)
                .speed(1)
                .range(1..=100),
        );
    });

    ui.horizontal(|ui| {
        ui.label("Opacity");
        ui.add(egui::Slider::new(&mut state.settings.grid.opacity, 0.0..=1.0));
    });
    ui.add_space(10.0);
}

fn show_axes_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Axes");
    ui.checkbox(&mut state.settings.axes.visible, "Show axes");
    ui.checkbox(&mut state.settings.axes.show_labels, "Labels");

    ui.horizontal(|ui| {
        ui.label("Length");
        ui.add(
            egui::DragValue::new(&mut state.settings.axes.length)
                .speed(0.1)
                .range(0.1..=50.0),
        );
    });
    ui.horizontal(|ui| {
        ui.label("Thickness");
        ui.add(
            egui::DragValue::new(&mut state.settings.axes.thickness)
                .speed(0.1)
                .range(0.5..=5.0),
        );
    });
    ui.add_space(10.0);
}

fn color_row(ui: &mut egui::Ui, label: &str, rgb: &mut [u8; 3]) {
    ui.horizontal(|ui| {
        ui.label(label);
        let mut color = egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2]);
        if ui.color_edit_button_srgba(&mut color).changed() {
            *rgb = [color.r(), color.g(), color.b()];
        }
    });
}

fn show_viewport_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Viewport");
    let viewport = &mut state.settings.viewport;
    color_row(ui, "Background", &mut viewport.background_color);
    color_row(ui, "Model edges", &mut viewport.model_color);
    color_row(ui, "Points", &mut viewport.point_color);

    ui.horizontal(|ui| {
        ui.label("Max points drawn");
        ui.add(
            egui::DragValue::new(&mut viewport.max_points)
                .speed(1000)
                .range(1000..=5_000_000),
        );
    });
    ui.add_space(10.0);
}

fn show_ui_settings(ui: &mut egui::Ui, state: &mut AppState) {
    ui.heading("Interface");
    ui.horizontal(|ui| {
        ui.label("Font size");
        ui.add(
            egui::DragValue::new(&mut state.settings.ui.font_size)
                .speed(0.5)
                .range(8.0..=24.0)
                .suffix(" pt"),
        );
    });
    ui.add_space(10.0);
}

fn show_settings_buttons(ui: &mut egui::Ui, state: &mut AppState) {
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Apply").clicked() {
            state.settings.save();
        }
        if ui.button("Reset").clicked() {
            state.settings = crate::state::settings::AppSettings::default();
        }
        if ui.button("Close").clicked() {
            state.show_settings_window = false;
        }
    });
}
