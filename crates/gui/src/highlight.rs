//! Element picking and highlight state.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::Arc;

use glam::Mat4;
use shared::{ExpressId, FragmentId, HighlightResult, LoadedModel, NodeId};

use crate::state::scene::SceneState;
use crate::state::selection::{record_from_result, SelectionState};
use crate::viewport::mesh::node_matrix;
use crate::viewport::picking::{pick_element, Ray};

pub const DEFAULT_STYLE: &str = "default";

/// Resolves a pick ray to an element and tracks what is highlighted
pub trait SelectionIndex {
    /// Highlight the element under `ray` with `style`. With `single`, the
    /// previous highlight of that style is replaced. A miss clears the style
    /// and returns `None`.
    fn highlight(
        &mut self,
        style: &str,
        single: bool,
        ray: &Ray,
    ) -> impl Future<Output = Option<HighlightResult>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightStyle {
    pub color: [u8; 3],
    pub opacity: f32,
    pub depth_test: bool,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: [0xBC, 0xF1, 0x24],
            opacity: 0.8,
            depth_test: false,
        }
    }
}

/// Highlighted elements of one style
pub type Highlight = BTreeMap<FragmentId, BTreeSet<ExpressId>>;

struct IndexedModel {
    node: NodeId,
    model: Arc<LoadedModel>,
    world_to_local: Mat4,
}

/// Pick index over the visible models of the scene
pub struct FragmentHighlighter {
    styles: BTreeMap<String, HighlightStyle>,
    pub outlines_enabled: bool,
    pub outline_color: [u8; 3],
    models: Vec<IndexedModel>,
    highlights: BTreeMap<String, Highlight>,
}

impl FragmentHighlighter {
    pub fn new() -> Self {
        let mut styles = BTreeMap::new();
        styles.insert(DEFAULT_STYLE.to_string(), HighlightStyle::default());
        Self {
            styles,
            outlines_enabled: true,
            outline_color: [0xF0, 0xFF, 0x7A],
            models: Vec::new(),
            highlights: BTreeMap::new(),
        }
    }

    pub fn add_style(&mut self, name: &str, style: HighlightStyle) {
        self.styles.insert(name.to_string(), style);
    }

    pub fn style(&self, name: &str) -> Option<&HighlightStyle> {
        self.styles.get(name)
    }

    /// Rebuild the index from the visible model nodes of `scene`.
    /// Highlights of fragments that are gone are dropped.
    pub fn update(&mut self, scene: &SceneState) {
        self.models = scene
            .models()
            .filter(|(node, _)| node.visible)
            .map(|(node, model)| IndexedModel {
                node: node.id.clone(),
                model: Arc::clone(model),
                world_to_local: node_matrix(&node.transform).inverse(),
            })
            .collect();

        let known: BTreeSet<&str> = scene
            .models()
            .flat_map(|(_, m)| m.fragments.iter().map(|f| f.id.as_str()))
            .collect();
        for highlight in self.highlights.values_mut() {
            highlight.retain(|fragment, _| known.contains(fragment.as_str()));
        }
        tracing::debug!("Highlighter indexes {} models", self.models.len());
    }

    pub fn indexed_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.models.iter().map(|m| &m.node)
    }

    /// Nearest element under `ray` and every fragment that contains it
    pub fn pick(&self, ray: &Ray) -> Option<HighlightResult> {
        let mut best: Option<(f32, &IndexedModel, ExpressId)> = None;

        for indexed in &self.models {
            let local_ray = ray.transformed(&indexed.world_to_local);
            for element in indexed.model.fragments.iter().flat_map(|f| &f.elements) {
                if let Some(t) = pick_element(&local_ray, element) {
                    if best.as_ref().map_or(true, |(bt, _, _)| t < *bt) {
                        best = Some((t, indexed, element.express_id));
                    }
                }
            }
        }

        let (_, indexed, id) = best?;
        let mut fragments: Vec<FragmentId> = indexed.model.fragments_of(id).cloned().collect();
        fragments.dedup();
        Some(HighlightResult { id, fragments })
    }

    pub fn highlighted(&self, style: &str) -> Option<&Highlight> {
        self.highlights.get(style).filter(|h| !h.is_empty())
    }

    pub fn is_highlighted(&self, fragment: &str, express_id: ExpressId) -> bool {
        self.highlights
            .values()
            .any(|h| h.get(fragment).is_some_and(|ids| ids.contains(&express_id)))
    }

    /// Clear one style, or all of them
    pub fn clear(&mut self, style: Option<&str>) {
        match style {
            Some(name) => {
                self.highlights.remove(name);
            }
            None => self.highlights.clear(),
        }
    }
}

impl Default for FragmentHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionIndex for FragmentHighlighter {
    async fn highlight(&mut self, style: &str, single: bool, ray: &Ray) -> Option<HighlightResult> {
        let Some(result) = self.pick(ray) else {
            self.clear(Some(style));
            return None;
        };
        if single {
            self.clear(Some(style));
        }
        let highlight = self.highlights.entry(style.to_string()).or_default();
        for fragment in &result.fragments {
            highlight.entry(fragment.clone()).or_default().insert(result.id);
        }
        Some(result)
    }
}

/// Turns viewport clicks into selection records
#[derive(Debug, Clone)]
pub struct SelectionController {
    pub style: String,
    pub single_selection: bool,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self {
            style: DEFAULT_STYLE.to_string(),
            single_selection: true,
        }
    }
}

impl SelectionController {
    /// Pick under `ray`. A hit replaces the selection record; a miss leaves it as is.
    pub async fn on_viewport_click<I: SelectionIndex>(
        &self,
        index: &mut I,
        ray: &Ray,
        selection: &mut SelectionState,
    ) -> Option<HighlightResult> {
        let result = index.highlight(&self.style, self.single_selection, ray).await?;
        tracing::debug!("Picked element {} in {:?}", result.id, result.fragments);
        selection.replace(record_from_result(&result));
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::scene::NodeKind;
    use crate::viewport::mesh::box_element;
    use glam::Vec3;
    use shared::{Fragment, IfcType, Transform};

    /// Index that always answers with the same result
    struct FixedIndex(Option<HighlightResult>);

    impl SelectionIndex for FixedIndex {
        async fn highlight(&mut self, _style: &str, _single: bool, _ray: &Ray) -> Option<HighlightResult> {
            self.0.clone()
        }
    }

    fn two_box_scene() -> SceneState {
        let model = LoadedModel {
            name: "m".into(),
            schema: None,
            fragments: vec![
                Fragment {
                    id: "F1".into(),
                    ifc_type: IfcType::new("IFCWALL"),
                    elements: vec![box_element(42, [-1.0, -1.0, -1.0], [1.0, 1.0, 1.0])],
                },
                Fragment {
                    id: "F2".into(),
                    ifc_type: IfcType::new("IFCSLAB"),
                    elements: vec![box_element(7, [-1.0, -1.0, -5.0], [1.0, 1.0, -3.0])],
                },
                Fragment {
                    id: "F3".into(),
                    ifc_type: IfcType::new("IFCCOVERING"),
                    elements: vec![box_element(7, [-1.0, -1.0, -5.1], [1.0, 1.0, -3.1])],
                },
            ],
            coordination_offset: [0.0; 3],
        };
        let mut scene = SceneState::default();
        scene.add("m", NodeKind::Model(Arc::new(model)), Transform::new());
        scene
    }

    fn down_z(x: f32) -> Ray {
        Ray::new(Vec3::new(x, 0.0, 10.0), Vec3::NEG_Z)
    }

    #[test]
    fn test_default_style() {
        let h = FragmentHighlighter::new();
        let style = h.style(DEFAULT_STYLE).unwrap();
        assert_eq!(style.color, [188, 241, 36]);
        assert_eq!(style.opacity, 0.8);
        assert!(!style.depth_test);
        assert!(h.outlines_enabled);
        assert_eq!(h.outline_color, [240, 255, 122]);
    }

    #[test]
    fn test_pick_nearest_element() {
        let mut h = FragmentHighlighter::new();
        h.update(&two_box_scene());
        let hit = h.pick(&down_z(0.0)).unwrap();
        assert_eq!(hit.id, 42);
        assert_eq!(hit.fragments, vec!["F1".to_string()]);
        assert!(h.pick(&down_z(5.0)).is_none());
    }

    #[test]
    fn test_pick_respects_node_transform() {
        let mut scene = two_box_scene();
        let id = scene.model_ids()[0].clone();
        scene.get_mut(&id).unwrap().transform.position = [10.0, 0.0, 0.0];
        let mut h = FragmentHighlighter::new();
        h.update(&scene);
        assert!(h.pick(&down_z(0.0)).is_none());
        assert_eq!(h.pick(&down_z(10.0)).unwrap().id, 42);
    }

    #[test]
    fn test_hidden_models_are_not_indexed() {
        let mut scene = two_box_scene();
        let id = scene.model_ids()[0].clone();
        scene.set_visible(&id, false);
        let mut h = FragmentHighlighter::new();
        h.update(&scene);
        assert_eq!(h.indexed_nodes().count(), 0);
        assert!(h.pick(&down_z(0.0)).is_none());
    }

    #[tokio::test]
    async fn test_miss_clears_style() {
        let mut h = FragmentHighlighter::new();
        h.update(&two_box_scene());
        assert!(h.highlight(DEFAULT_STYLE, true, &down_z(0.0)).await.is_some());
        assert!(h.is_highlighted("F1", 42));
        assert!(h.highlight(DEFAULT_STYLE, true, &down_z(5.0)).await.is_none());
        assert!(h.highlighted(DEFAULT_STYLE).is_none());
    }

    #[tokio::test]
    async fn test_controller_replaces_record_on_hit() {
        let controller = SelectionController::default();
        let mut selection = SelectionState::default();
        selection.replace(BTreeMap::from([("OLD".to_string(), vec![1])]));

        let mut index = FixedIndex(Some(HighlightResult {
            id: 42,
            fragments: vec!["F1".into()],
        }));
        controller.on_viewport_click(&mut index, &down_z(0.0), &mut selection).await;
        assert_eq!(selection.record().unwrap(), &BTreeMap::from([("F1".to_string(), vec![42])]));
    }

    #[tokio::test]
    async fn test_controller_keeps_record_on_miss() {
        let controller = SelectionController::default();
        let mut selection = SelectionState::default();
        selection.replace(BTreeMap::from([("F1".to_string(), vec![42])]));
        let version = selection.version;

        let mut index = FixedIndex(None);
        assert!(controller.on_viewport_click(&mut index, &down_z(0.0), &mut selection).await.is_none());
        assert_eq!(selection.version, version);
        assert!(selection.contains("F1", 42));
    }

    #[tokio::test]
    async fn test_element_in_two_fragments() {
        let mut h = FragmentHighlighter::new();
        h.update(&two_box_scene());
        // Slab and covering share element 7; hit it from below the wall
        let ray = Ray::new(Vec3::new(0.0, 10.0, -4.0), Vec3::NEG_Y);
        let controller = SelectionController::default();
        let mut selection = SelectionState::default();
        controller.on_viewport_click(&mut h, &ray, &mut selection).await;
        let record = selection.record().unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record["F2"], vec![7]);
        assert_eq!(record["F3"], vec![7]);
    }
}
