//! Asset sources: where model bytes come from.
//!
//! The viewer normally fetches assets over HTTP from the asset server, but can
//! also read them from a local directory. Tests use the in-memory source.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::{LoadError, Result};

/// Fetch raw bytes for an asset path such as `/Duplex_A_20110907.ifc`.
pub trait AssetSource {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// HTTP GET relative to a base URL
#[derive(Clone)]
pub struct HttpAssetSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAssetSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl AssetSource for HttpAssetSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url_for(path);
        let fetch_err = |e: reqwest::Error| LoadError::Fetch {
            path: path.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(&url).send().await.map_err(fetch_err)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LoadError::NotFound {
                path: path.to_string(),
            });
        }
        let response = response.error_for_status().map_err(fetch_err)?;
        let bytes = response.bytes().await.map_err(fetch_err)?;

        tracing::debug!("Fetched {} ({} bytes)", url, bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Files under a local root directory
#[derive(Clone)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl AssetSource for DirAssetSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let file = self.resolve(path);
        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(LoadError::NotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(LoadError::Io(e)),
        }
    }
}

/// In-memory assets keyed by path
#[derive(Clone, Default)]
pub struct MemoryAssetSource {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.files.insert(normalize(path), bytes.into());
    }

    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(&normalize(path))
    }
}

impl AssetSource for MemoryAssetSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                path: path.to_string(),
            })
    }
}

/// Source chosen at startup from `--assets` / settings
#[derive(Clone)]
pub enum AnySource {
    Http(HttpAssetSource),
    Dir(DirAssetSource),
}

impl AnySource {
    /// `http://` and `https://` locations go over the network, anything else is a directory
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            AnySource::Http(HttpAssetSource::new(location))
        } else {
            AnySource::Dir(DirAssetSource::new(location))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            AnySource::Http(s) => s.base_url.clone(),
            AnySource::Dir(s) => s.root.display().to_string(),
        }
    }
}

impl AssetSource for AnySource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        match self {
            AnySource::Http(s) => s.fetch(path).await,
            AnySource::Dir(s) => s.fetch(path).await,
        }
    }
}

fn normalize(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_slashes() {
        let s = HttpAssetSource::new("http://localhost:3001/");
        assert_eq!(s.url_for("/a.ifc"), "http://localhost:3001/a.ifc");
        assert_eq!(s.url_for("b.ply"), "http://localhost:3001/b.ply");
    }

    #[test]
    fn test_location_kind() {
        assert!(matches!(AnySource::from_location("https://x.org/assets"), AnySource::Http(_)));
        assert!(matches!(AnySource::from_location("./assets"), AnySource::Dir(_)));
    }

    #[tokio::test]
    async fn test_memory_source_normalizes_paths() {
        let mut s = MemoryAssetSource::new();
        s.insert("model.ifc", b"data".to_vec());
        assert_eq!(s.fetch("/model.ifc").await.unwrap(), b"data");
        assert!(matches!(
            s.fetch("/missing.ifc").await,
            Err(LoadError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_dir_source_missing_file_is_not_found() {
        let s = DirAssetSource::new(std::env::temp_dir().join("bimview-no-such-dir"));
        let err = s.fetch("/nothing.ply").await.unwrap_err();
        assert!(err.is_fetch());
    }
}
