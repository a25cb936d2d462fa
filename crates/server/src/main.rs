use axum::{routing::get, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

mod config;
mod routes;

use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub assets_dir: Arc<PathBuf>,
}

/// API routes plus the asset directory served at `/`
pub fn app(assets_dir: PathBuf) -> Router {
    let state = AppState {
        assets_dir: Arc::new(assets_dir.clone()),
    };

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/assets", get(routes::list_assets))
        .fallback_service(ServeDir::new(assets_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env();
    if !config.assets_dir.is_dir() {
        tracing::warn!("Asset directory {} does not exist", config.assets_dir.display());
    }

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {e}", config.addr);
            return;
        }
    };
    tracing::info!(
        addr = %config.addr,
        assets = %config.assets_dir.display(),
        "Asset server running"
    );

    if let Err(e) = axum::serve(listener, app(config.assets_dir)).await {
        tracing::error!("Server error: {e}");
    }
}
