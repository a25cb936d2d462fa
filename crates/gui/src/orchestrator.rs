//! Load orchestration: fetch → parse → attach → panel entry.
//!
//! The async half (`fetch_*`) touches no UI state and can run on any runtime
//! thread. The sync half (`attach_*`) mutates [`AppState`] and runs where the
//! state lives.

use std::collections::HashSet;
use std::sync::Arc;

use shared::{
    AssetFormat, AssetRef, IfcType, LoadedModel, LoaderSettings, NodeId, PointCloud, PointsMaterial,
    Transform,
};

use crate::assets::AssetSource;
use crate::error::Result;
use crate::loaders::fragments::export_bundle;
use crate::loaders::{decode_point_cloud, ModelLoader};
use crate::state::panel::{SHOW_BIM, SHOW_PLY, SHOW_PLY_CONTROL};
use crate::state::scene::{NodeKind, SceneState};
use crate::state::settings::AssetSettings;
use crate::state::{AppState, LoadKind};
use crate::transform::{TransformControl, POINT_CLOUD_ROTATION, POINT_SIZE, TRANSFORM_CONTROL_SIZE};

/// Categories that never become fragments
pub const EXCLUDED_CATEGORIES: [IfcType; 3] = [
    IfcType::TENDON_ANCHOR,
    IfcType::REINFORCING_BAR,
    IfcType::REINFORCING_ELEMENT,
];

/// Exclude reinforcement and move models to the origin. Idempotent.
pub fn configure_loader(settings: &mut LoaderSettings) {
    for category in EXCLUDED_CATEGORIES {
        settings.exclude(category);
    }
    settings.coordinate_to_origin = true;
    settings.optimize_profiles = true;
}

/// The BIM asset named by the settings
pub fn bim_asset(assets: &AssetSettings) -> AssetRef {
    AssetRef::infer(assets.bim_path.clone())
        .unwrap_or_else(|| AssetRef::new(assets.bim_path.clone(), AssetFormat::Ifc))
}

/// The point-cloud asset named by the settings
pub fn ply_asset(assets: &AssetSettings) -> AssetRef {
    AssetRef::new(assets.ply_path.clone(), AssetFormat::Ply)
}

/// Nodes created by a point-cloud load
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloudNodes {
    pub points: NodeId,
    pub control: NodeId,
}

pub struct LoadOrchestrator<S, L> {
    source: S,
    loader: L,
    settings: LoaderSettings,
}

impl<S: AssetSource, L: ModelLoader> LoadOrchestrator<S, L> {
    pub fn new(source: S, loader: L) -> Self {
        let mut settings = LoaderSettings::default();
        configure_loader(&mut settings);
        Self {
            source,
            loader,
            settings,
        }
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and parse a model without touching the scene
    pub async fn fetch_model(&self, asset: &AssetRef, name: &str) -> Result<LoadedModel> {
        let bytes = self.source.fetch(&asset.path).await?;
        tracing::debug!("Parsing {} ({}, {} bytes)", asset.path, asset.format, bytes.len());
        self.loader.load(&bytes, name, &self.settings)
    }

    /// Fetch and decode a point cloud without touching the scene
    pub async fn fetch_point_cloud(&self, asset: &AssetRef) -> Result<PointCloud> {
        let bytes = self.source.fetch(&asset.path).await?;
        decode_point_cloud(&bytes)
    }

    /// Load a model and add it to the scene with a "show bim" toggle.
    ///
    /// Rejected with `Busy` while a background BIM load holds the slot. Claims
    /// no slot itself; the state stays borrowed until the call returns.
    pub async fn load_model(&self, state: &mut AppState, asset: &AssetRef, name: &str) -> Result<NodeId> {
        state.loads.ensure_idle(LoadKind::Bim)?;
        let model = self.fetch_model(asset, name).await?;
        Ok(attach_model(state, model))
    }

    /// Load a point cloud, add it with a gizmo attached, and add both toggles
    pub async fn load_point_cloud(&self, state: &mut AppState, asset: &AssetRef) -> Result<PointCloudNodes> {
        state.loads.ensure_idle(LoadKind::PointCloud)?;
        let cloud = self.fetch_point_cloud(asset).await?;
        Ok(attach_point_cloud(state, cloud, asset.stem()))
    }
}

/// Add a parsed model to the scene and the pick index. Fragment ids already
/// used by a loaded model get a `#<n>` suffix.
pub fn attach_model(state: &mut AppState, mut model: LoadedModel) -> NodeId {
    unique_fragment_ids(&state.scene, &mut model);
    let name = model.name.clone();
    let fragments = model.fragments.len();
    let elements = model.element_count();
    let id = state
        .scene
        .add(name.clone(), NodeKind::Model(Arc::new(model)), Transform::new());
    state.highlighter.update(&state.scene);
    state.panel.add_toggle(SHOW_BIM, id.clone());
    tracing::info!("Loaded model '{name}': {fragments} fragments, {elements} elements");
    id
}

/// Suffix every fragment id of `model` with the first `#<n>` (n >= 2) that
/// clashes with no fragment in the scene. No-op when nothing clashes.
fn unique_fragment_ids(scene: &SceneState, model: &mut LoadedModel) {
    let taken: HashSet<&str> = scene
        .models()
        .flat_map(|(_, m)| m.fragments.iter().map(|f| f.id.as_str()))
        .collect();
    if model.fragments.iter().all(|f| !taken.contains(f.id.as_str())) {
        return;
    }

    let clashes = |n: usize| {
        model
            .fragments
            .iter()
            .any(|f| taken.contains(format!("{}#{n}", f.id).as_str()))
    };
    let mut n = 2;
    while clashes(n) {
        n += 1;
    }
    for fragment in &mut model.fragments {
        fragment.id = format!("{}#{n}", fragment.id);
    }
    tracing::debug!("Renamed fragments of '{}' with suffix #{n}", model.name);
}

/// Add a decoded point cloud, rotated into the scene's Y-up frame and placed
/// at the registration offset, with a transform control attached.
pub fn attach_point_cloud(state: &mut AppState, cloud: PointCloud, name: &str) -> PointCloudNodes {
    let material = PointsMaterial {
        size: POINT_SIZE,
        depth_test: true,
        depth_write: true,
        vertex_colors: cloud.has_colors(),
    };
    let transform = Transform {
        position: state.settings.assets.ply_offset,
        rotation: POINT_CLOUD_ROTATION,
        scale: [1.0; 3],
    };
    let count = cloud.len();
    let points = state.scene.add(
        name,
        NodeKind::Points {
            cloud: Arc::new(cloud),
            material,
        },
        transform,
    );

    let mut control = TransformControl::new(TRANSFORM_CONTROL_SIZE);
    control.attach(points.clone());
    let control = state.scene.add(
        format!("{name} control"),
        NodeKind::TransformControl(control),
        Transform::new(),
    );

    state.panel.add_toggle(SHOW_PLY_CONTROL, control.clone());
    state.panel.add_toggle(SHOW_PLY, points.clone());
    tracing::info!("Loaded point cloud '{name}': {count} points");

    PointCloudNodes { points, control }
}

/// Serialize every loaded model as a fragments bundle
pub fn export_fragments(state: &AppState) -> Result<Vec<u8>> {
    export_bundle(state.scene.models().map(|(_, model)| model.as_ref()))
}

/// Remove all models with their toggles, pick index entries and the selection.
/// Returns the number of models removed.
pub fn dispose_models(state: &mut AppState) -> usize {
    let ids = state.scene.model_ids();
    for id in &ids {
        state.scene.remove(id);
        state.panel.remove_toggles_for(id);
    }
    state.highlighter.update(&state.scene);
    state.highlighter.clear(None);
    state.selection.clear();
    if !ids.is_empty() {
        tracing::info!("Disposed {} models", ids.len());
    }
    ids.len()
}
