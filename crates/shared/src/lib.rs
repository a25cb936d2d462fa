use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Scene node identifier
pub type NodeId = String;

/// Identifier of a geometry fragment inside a loaded model
pub type FragmentId = String;

/// IFC-level identifier of a model element (the `#123` STEP instance number)
pub type ExpressId = u32;

// ============================================================================
// Assets
// ============================================================================

/// Binary format of a model asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetFormat {
    /// IFC STEP physical file
    Ifc,
    /// Serialized fragments bundle (JSON)
    Fragments,
    /// Stanford PLY point cloud
    Ply,
}

impl AssetFormat {
    /// Infer the format from a path extension
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "ifc" => Some(AssetFormat::Ifc),
            "frag" | "json" => Some(AssetFormat::Fragments),
            "ply" => Some(AssetFormat::Ply),
            _ => None,
        }
    }
}

impl fmt::Display for AssetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetFormat::Ifc => "IFC",
            AssetFormat::Fragments => "fragments",
            AssetFormat::Ply => "PLY",
        };
        f.write_str(name)
    }
}

/// Reference to a model file relative to the asset root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub path: String,
    pub format: AssetFormat,
}

impl AssetRef {
    pub fn new(path: impl Into<String>, format: AssetFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Build a reference whose format is taken from the path extension
    pub fn infer(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        let format = AssetFormat::from_path(&path)?;
        Some(Self { path, format })
    }

    /// File name without directories or extension
    pub fn stem(&self) -> &str {
        let file = self.path.rsplit('/').next().unwrap_or(&self.path);
        file.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(file)
    }
}

/// One file served from the asset directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<AssetFormat>,
    pub size: u64,
}

// ============================================================================
// IFC categories and loader settings
// ============================================================================

/// IFC entity type name, stored upper-case (`IFCWALL`, `IFCSLAB`, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IfcType(Cow<'static, str>);

impl IfcType {
    pub const TENDON_ANCHOR: IfcType = IfcType(Cow::Borrowed("IFCTENDONANCHOR"));
    pub const REINFORCING_BAR: IfcType = IfcType(Cow::Borrowed("IFCREINFORCINGBAR"));
    pub const REINFORCING_ELEMENT: IfcType = IfcType(Cow::Borrowed("IFCREINFORCINGELEMENT"));

    pub fn new(name: &str) -> Self {
        Self(Cow::Owned(name.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IfcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parser settings handed to a model loader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// Element types that produce no fragments
    #[serde(default)]
    pub excluded_categories: BTreeSet<IfcType>,
    /// Move the model so its bounds are centred on the origin
    #[serde(default)]
    pub coordinate_to_origin: bool,
    /// Merge duplicate vertices inside each element
    #[serde(default)]
    pub optimize_profiles: bool,
}

impl LoaderSettings {
    pub fn exclude(&mut self, category: IfcType) {
        self.excluded_categories.insert(category);
    }

    pub fn is_excluded(&self, category: &IfcType) -> bool {
        self.excluded_categories.contains(category)
    }
}

// ============================================================================
// Models and fragments
// ============================================================================

/// Object transform (Euler rotation in radians, XYZ order)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Triangulated geometry of one element inside a fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementGeometry {
    pub express_id: ExpressId,
    #[serde(default)]
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub indices: Vec<u32>,
}

impl ElementGeometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_geometry(&self) -> bool {
        !self.indices.is_empty()
    }
}

/// Renderable partition of a model: elements sharing one IFC type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub id: FragmentId,
    pub ifc_type: IfcType,
    pub elements: Vec<ElementGeometry>,
}

impl Fragment {
    pub fn contains(&self, express_id: ExpressId) -> bool {
        self.elements.iter().any(|e| e.express_id == express_id)
    }

    pub fn express_ids(&self) -> impl Iterator<Item = ExpressId> + '_ {
        self.elements.iter().map(|e| e.express_id)
    }
}

/// A parsed model ready to be attached to the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedModel {
    pub name: String,
    /// IFC schema from the file header, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub fragments: Vec<Fragment>,
    /// Translation that was subtracted from the source coordinates
    #[serde(default)]
    pub coordination_offset: [f64; 3],
}

impl LoadedModel {
    pub fn fragment(&self, id: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.id == id)
    }

    /// Fragments holding geometry for the given element
    pub fn fragments_of(&self, express_id: ExpressId) -> impl Iterator<Item = &FragmentId> + '_ {
        self.fragments
            .iter()
            .filter(move |f| f.contains(express_id))
            .map(|f| &f.id)
    }

    pub fn element_count(&self) -> usize {
        let mut ids: Vec<ExpressId> = self.fragments.iter().flat_map(|f| f.express_ids()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

/// On-disk container for exported fragments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentsBundle {
    #[serde(default = "default_bundle_version")]
    pub version: u32,
    pub models: Vec<LoadedModel>,
}

fn default_bundle_version() -> u32 {
    1
}

impl FragmentsBundle {
    pub fn new(models: Vec<LoadedModel>) -> Self {
        Self {
            version: default_bundle_version(),
            models,
        }
    }
}

/// Outcome of a successful highlight pick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightResult {
    /// Picked element
    pub id: ExpressId,
    /// Every fragment the element has geometry in
    pub fragments: Vec<FragmentId>,
}

// ============================================================================
// Point clouds
// ============================================================================

/// Decoded point cloud with optional per-vertex colors in 0..1
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub positions: Vec<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<[f32; 3]>>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.as_ref().is_some_and(|c| c.len() == self.positions.len())
    }
}

/// Material used to draw point clouds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsMaterial {
    pub size: f32,
    pub depth_test: bool,
    pub depth_write: bool,
    pub vertex_colors: bool,
}

impl Default for PointsMaterial {
    fn default() -> Self {
        Self {
            size: 0.1,
            depth_test: true,
            depth_write: true,
            vertex_colors: false,
        }
    }
}
