//! Model loaders: turn fetched bytes into scene-ready data.

pub mod fragments;
pub mod ifc;
pub mod ply;

use shared::{AssetFormat, Fragment, LoadedModel, LoaderSettings};

use crate::error::{LoadError, Result};
use crate::viewport::mesh::{elements_bounds, translate_element, weld_vertices};

pub use fragments::FragmentsLoader;
pub use ifc::IfcStepLoader;
pub use ply::decode_point_cloud;

/// Parses a model buffer into fragments.
pub trait ModelLoader {
    fn load(&self, bytes: &[u8], name: &str, settings: &LoaderSettings) -> Result<LoadedModel>;
}

/// Apply `optimize_profiles` welding and `coordinate_to_origin` recentering.
/// Returns the coordination offset with the recentering added.
pub(crate) fn prepare_fragments(
    fragments: &mut [Fragment],
    name: &str,
    settings: &LoaderSettings,
    offset: [f64; 3],
) -> [f64; 3] {
    if settings.optimize_profiles {
        let removed: usize = fragments
            .iter_mut()
            .flat_map(|f| f.elements.iter_mut())
            .map(weld_vertices)
            .sum();
        tracing::debug!("Welded {removed} duplicate vertices in '{name}'");
    }

    if !settings.coordinate_to_origin {
        return offset;
    }
    let Some(bounds) = elements_bounds(fragments.iter().flat_map(|f| &f.elements)) else {
        return offset;
    };
    let center = bounds.center();
    for element in fragments.iter_mut().flat_map(|f| f.elements.iter_mut()) {
        translate_element(element, -center);
    }
    [
        offset[0] + center.x as f64,
        offset[1] + center.y as f64,
        offset[2] + center.z as f64,
    ]
}

/// Picks the IFC or fragments loader by looking at the first bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BimLoader;

impl BimLoader {
    pub fn sniff(bytes: &[u8]) -> Option<AssetFormat> {
        let start = bytes
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .map(|i| &bytes[i..])
            .unwrap_or_default();
        let start = start.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(start);

        if start.starts_with(ifc::STEP_MAGIC.as_bytes()) {
            Some(AssetFormat::Ifc)
        } else if start.starts_with(b"{") {
            Some(AssetFormat::Fragments)
        } else {
            None
        }
    }
}

impl ModelLoader for BimLoader {
    fn load(&self, bytes: &[u8], name: &str, settings: &LoaderSettings) -> Result<LoadedModel> {
        match Self::sniff(bytes) {
            Some(AssetFormat::Ifc) => IfcStepLoader.load(bytes, name, settings),
            Some(AssetFormat::Fragments) => FragmentsLoader.load(bytes, name, settings),
            _ => Err(LoadError::format(AssetFormat::Ifc, "unrecognized model data")),
        }
    }
}
