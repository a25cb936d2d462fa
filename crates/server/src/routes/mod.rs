use std::path::Path;

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use shared::{AssetEntry, AssetFormat};

use crate::AppState;

/// Health check
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Every model and point cloud file under the asset directory
pub async fn list_assets(State(state): State<AppState>) -> Result<Json<Vec<AssetEntry>>, StatusCode> {
    let dir = state.assets_dir.clone();
    let entries = tokio::task::spawn_blocking(move || collect_assets(&dir))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map_err(|e| {
            tracing::error!("Failed to list assets: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(entries))
}

/// Walk `root` and list files with a known asset extension, sorted by path.
/// Paths are `/`-prefixed and relative to `root`, as the asset sources expect.
pub fn collect_assets(root: &Path) -> std::io::Result<Vec<AssetEntry>> {
    let mut entries = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let relative: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            let path = format!("/{}", relative.join("/"));
            let Some(format) = AssetFormat::from_path(&path) else {
                continue;
            };
            entries.push(AssetEntry {
                path,
                format: Some(format),
                size: entry.metadata()?.len(),
            });
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use std::path::PathBuf;
    use tower::ServiceExt;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            let dir = std::env::temp_dir().join(format!("bimview-assets-{}", uuid::Uuid::new_v4()));
            std::fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn sample_dir() -> TempDir {
        let dir = TempDir::new();
        std::fs::write(dir.0.join("Duplex_A_20110907.ifc"), "ISO-10303-21;").unwrap();
        std::fs::write(dir.0.join("Duplex_A_20110907.ply"), "ply\n").unwrap();
        std::fs::write(dir.0.join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(dir.0.join("exports")).unwrap();
        std::fs::write(dir.0.join("exports").join("duplex.frag"), "{}").unwrap();
        dir
    }

    #[test]
    fn test_collect_assets_filters_and_sorts() {
        let dir = sample_dir();
        let assets = collect_assets(&dir.0).unwrap();
        let paths: Vec<&str> = assets.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/Duplex_A_20110907.ifc", "/Duplex_A_20110907.ply", "/exports/duplex.frag"]
        );
        assert_eq!(assets[0].format, Some(AssetFormat::Ifc));
        assert_eq!(assets[0].size, 13);
        assert_eq!(assets[2].format, Some(AssetFormat::Fragments));
    }

    #[test]
    fn test_collect_assets_missing_dir_fails() {
        let dir = TempDir::new();
        assert!(collect_assets(&dir.0.join("missing")).is_err());
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new();
        let response = crate::app(dir.0.clone())
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_and_serve_assets() {
        let dir = sample_dir();

        let response = crate::app(dir.0.clone())
            .oneshot(Request::get("/api/assets").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let listed: Vec<AssetEntry> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(listed.len(), 3);

        let response = crate::app(dir.0.clone())
            .oneshot(Request::get("/Duplex_A_20110907.ifc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ISO-10303-21;");

        let response = crate::app(dir.0.clone())
            .oneshot(Request::get("/missing.ply").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
