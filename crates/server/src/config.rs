//! Server configuration loaded from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory served at `/`
    pub assets_dir: PathBuf,
    pub addr: SocketAddr,
}

impl Config {
    /// `BIMVIEW_ASSETS_DIR` (default `assets`) and `BIMVIEW_ADDR` (default `0.0.0.0:3001`)
    pub fn from_env() -> Self {
        let assets_dir = std::env::var("BIMVIEW_ASSETS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("assets"));
        let addr = std::env::var("BIMVIEW_ADDR")
            .ok()
            .and_then(|v| match v.parse() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    tracing::warn!("Ignoring BIMVIEW_ADDR={v}: {e}");
                    None
                }
            })
            .unwrap_or_else(default_addr);
        Self { assets_dir, addr }
    }
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3001))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_addr() {
        assert_eq!(default_addr().to_string(), "0.0.0.0:3001");
    }
}
