mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::state`, `crate::highlight`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use bimview_gui_lib::assets;
pub use bimview_gui_lib::highlight;
pub use bimview_gui_lib::loaders;
pub use bimview_gui_lib::orchestrator;
pub use bimview_gui_lib::state;
pub use bimview_gui_lib::tasks;
pub use bimview_gui_lib::transform;

use app::BimViewApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bimview_gui=info,bimview_gui_lib=info".into()),
        )
        .init();

    // Parse --assets <url|dir> argument
    let assets = parse_assets_arg();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("bimview-loader")
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            return;
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("bimview: BIM and point cloud viewer")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "bimview",
        native_options,
        Box::new(move |cc| Ok(Box::new(BimViewApp::new(cc, runtime, assets)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_assets_arg() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--assets" {
            match args.get(i + 1) {
                Some(location) => {
                    tracing::info!("Using asset location {location}");
                    return Some(location.clone());
                }
                None => tracing::error!("--assets expects a URL or directory"),
            }
            break;
        }
        i += 1;
    }
    None
}
