//! Application settings

use serde::{Deserialize, Serialize};

/// Where the viewer finds its assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSettings {
    /// HTTP base URL or local directory
    pub location: String,
    pub bim_path: String,
    pub ply_path: String,
    /// Position applied to the point cloud so it lines up with the model
    pub ply_offset: [f64; 3],
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            location: "http://localhost:3001".to_string(),
            bim_path: "/Duplex_A_20110907.ifc".to_string(),
            ply_path: "/Duplex_A_20110907.ply".to_string(),
            ply_offset: [-8.331974467885479, -2.588762760779156, -11.952101154993713],
        }
    }
}

/// Grid display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSettings {
    /// Show grid
    pub visible: bool,
    /// Grid cell size in meters
    pub size: f32,
    /// Number of grid lines in each direction from origin
    pub range: i32,
    /// Grid line opacity (0.0 - 1.0)
    pub opacity: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: true,
            size: 1.0,
            range: 10,
            opacity: 0.5,
        }
    }
}

/// Axis display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisSettings {
    /// Show axes
    pub visible: bool,
    /// Axis arrow length
    pub length: f32,
    /// Axis line thickness
    pub thickness: f32,
    /// Show axis labels (X, Y, Z)
    pub show_labels: bool,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            visible: true,
            length: 1.5,
            thickness: 2.0,
            show_labels: true,
        }
    }
}

/// Viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    /// Model edge color RGB
    pub model_color: [u8; 3],
    /// Point color when the cloud has no colors
    pub point_color: [u8; 3],
    /// Points drawn per frame at most
    pub max_points: usize,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [30, 30, 35],
            model_color: [170, 175, 185],
            point_color: [200, 200, 200],
            max_points: 200_000,
        }
    }
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { font_size: 14.0 }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub assets: AssetSettings,
    /// Grid settings
    pub grid: GridSettings,
    /// Axis settings
    pub axes: AxisSettings,
    /// Viewport settings
    pub viewport: ViewportSettings,
    /// UI settings
    pub ui: UiSettings,
}

impl AppSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "bimview", "bimview") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                match serde_json::from_str(&json) {
                    Ok(settings) => return settings,
                    Err(e) => tracing::warn!("Ignoring invalid settings file {}: {e}", config_path.display()),
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(dirs) = directories::ProjectDirs::from("com", "bimview", "bimview") {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                let config_path = config_dir.join("settings.json");
                if let Ok(json) = serde_json::to_string_pretty(self) {
                    let _ = std::fs::write(config_path, json);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_asset_paths() {
        let s = AppSettings::default();
        assert_eq!(s.assets.bim_path, "/Duplex_A_20110907.ifc");
        assert_eq!(s.assets.ply_path, "/Duplex_A_20110907.ply");
        assert_eq!(s.assets.ply_offset[0], -8.331974467885479);
    }

    #[test]
    fn test_missing_assets_section_uses_defaults() {
        let json = serde_json::to_value(AppSettings::default()).unwrap();
        let mut obj = json.as_object().unwrap().clone();
        obj.remove("assets");
        let s: AppSettings = serde_json::from_value(serde_json::Value::Object(obj)).unwrap();
        assert_eq!(s.assets, AssetSettings::default());
    }
}
