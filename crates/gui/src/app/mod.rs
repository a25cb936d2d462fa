//! Main application module

mod keyboard;
mod menus;
mod styles;

use eframe::egui;
use tokio::runtime::Runtime;

use crate::assets::AnySource;
use crate::loaders::BimLoader;
use crate::orchestrator::LoadOrchestrator;
use crate::state::{AppSettings, AppState};
use crate::tasks::LoadTasks;
use crate::ui::{control_panel, properties, status_bar};
use crate::viewport::ViewportPanel;

/// Main application
pub struct BimViewApp {
    state: AppState,
    viewport: ViewportPanel,
    runtime: Runtime,
    loads: LoadTasks<AnySource, BimLoader>,
    /// Last applied font size (to detect changes)
    last_font_size: f32,
}

impl BimViewApp {
    pub fn new(cc: &eframe::CreationContext<'_>, runtime: Runtime, assets_override: Option<String>) -> Self {
        let mut settings = AppSettings::load();
        if let Some(location) = assets_override {
            settings.assets.location = location;
        }

        let source = AnySource::from_location(&settings.assets.location);
        tracing::info!("Serving assets from {}", source.describe());
        let loads = LoadTasks::new(LoadOrchestrator::new(source, BimLoader), runtime.handle().clone());

        styles::configure_styles(&cc.egui_ctx, settings.ui.font_size);
        let last_font_size = settings.ui.font_size;

        Self {
            state: AppState::new(settings),
            viewport: ViewportPanel::new(),
            runtime,
            loads,
            last_font_size,
        }
    }
}

impl eframe::App for BimViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply font size if changed
        if self.state.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.state.settings.ui.font_size);
            self.last_font_size = self.state.settings.ui.font_size;
        }

        // Attach finished loads; frame the first thing that shows up
        let had_geometry = self.state.scene.bounds().is_some();
        if self.loads.poll(&mut self.state) && !had_geometry {
            self.viewport.frame_scene(&self.state);
        }
        if self.state.loads.any() {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }

        keyboard::handle_keyboard(ctx, &mut self.state, &mut self.viewport);

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.state);
                menus::view_menu(ui, &mut self.state, &mut self.viewport);
                menus::settings_menu(ui, &mut self.state);
            });
        });

        // ── Settings window ──────────────────────────────────
        menus::settings_window(ctx, &mut self.state);

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.state);
            });

        // ── Left panel: controls ─────────────────────────────
        egui::SidePanel::left("control_panel")
            .default_width(200.0)
            .width_range(160.0..=360.0)
            .resizable(true)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
            )
            .show(ctx, |ui| {
                if let Some(action) = control_panel::show(ui, &mut self.state) {
                    if let Err(e) = self.loads.start(&mut self.state, action) {
                        self.state.set_error(e.to_string());
                    }
                }
            });

        // ── Right panel: selection ───────────────────────────
        egui::SidePanel::right("properties")
            .default_width(260.0)
            .width_range(180.0..=480.0)
            .resizable(true)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("props_scroll")
                    .show(ui, |ui| {
                        properties::show(ui, &mut self.state);
                    });
            });

        // ── Central panel: 3D viewport ───────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.state, &self.runtime);
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.settings.save();
    }
}
