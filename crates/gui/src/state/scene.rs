//! Scene host: the node list the viewport draws

use std::sync::Arc;

use shared::{LoadedModel, NodeId, PointCloud, PointsMaterial, Transform};

use crate::transform::TransformControl;
use crate::viewport::mesh::{elements_bounds, node_matrix};
use crate::viewport::picking::Aabb;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional,
    Ambient,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub intensity: f32,
}

/// Payload of a scene node
#[derive(Debug, Clone)]
pub enum NodeKind {
    Model(Arc<LoadedModel>),
    Points {
        cloud: Arc<PointCloud>,
        material: PointsMaterial,
    },
    TransformControl(TransformControl),
    Light(Light),
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Model(_) => "model",
            NodeKind::Points { .. } => "points",
            NodeKind::TransformControl(_) => "transform control",
            NodeKind::Light(_) => "light",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub visible: bool,
    pub transform: Transform,
    pub kind: NodeKind,
}

impl SceneNode {
    /// World-space bounds of the node's geometry
    pub fn world_bounds(&self) -> Option<Aabb> {
        let local = match &self.kind {
            NodeKind::Model(model) => {
                elements_bounds(model.fragments.iter().flat_map(|f| &f.elements))?
            }
            NodeKind::Points { cloud, .. } => Aabb::from_positions(&cloud.positions)?,
            _ => return None,
        };
        Some(local.transformed(&node_matrix(&self.transform)))
    }
}

/// Owns every node in the viewport
#[derive(Debug, Default)]
pub struct SceneState {
    nodes: Vec<SceneNode>,
    /// Monotonically increasing version counter for cache invalidation
    version: u64,
}

impl SceneState {
    /// Add the default lights. Does nothing if the scene already has lights.
    pub fn setup(&mut self) {
        if self.nodes.iter().any(|n| matches!(n.kind, NodeKind::Light(_))) {
            return;
        }
        let mut sun = Transform::new();
        sun.position = [5.0, 10.0, 3.0];
        self.add(
            "directional light",
            NodeKind::Light(Light {
                kind: LightKind::Directional,
                intensity: 0.5,
            }),
            sun,
        );
        self.add(
            "ambient light",
            NodeKind::Light(Light {
                kind: LightKind::Ambient,
                intensity: 0.5,
            }),
            Transform::new(),
        );
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn add(&mut self, name: impl Into<String>, kind: NodeKind, transform: Transform) -> NodeId {
        let id = uuid::Uuid::new_v4().to_string();
        self.nodes.push(SceneNode {
            id: id.clone(),
            name: name.into(),
            visible: true,
            transform,
            kind,
        });
        self.version += 1;
        id
    }

    pub fn remove(&mut self, id: &str) -> Option<SceneNode> {
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        self.version += 1;
        Some(self.nodes.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Mutable access; bumps the version only when the node exists
    pub fn get_mut(&mut self, id: &str) -> Option<&mut SceneNode> {
        let node = self.nodes.iter_mut().find(|n| n.id == id)?;
        self.version += 1;
        Some(node)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns false if the node does not exist
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                if node.visible != visible {
                    node.visible = visible;
                    self.version += 1;
                }
                true
            }
            None => false,
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.get(id).is_some_and(|n| n.visible)
    }

    /// Ids of all model nodes
    pub fn model_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Model(_)))
            .map(|n| n.id.clone())
            .collect()
    }

    pub fn models(&self) -> impl Iterator<Item = (&SceneNode, &Arc<LoadedModel>)> {
        self.nodes.iter().filter_map(|n| match &n.kind {
            NodeKind::Model(model) => Some((n, model)),
            _ => None,
        })
    }

    pub fn transform_control(&self, id: &str) -> Option<&TransformControl> {
        match &self.get(id)?.kind {
            NodeKind::TransformControl(control) => Some(control),
            _ => None,
        }
    }

    pub fn transform_control_mut(&mut self, id: &str) -> Option<&mut TransformControl> {
        match &mut self.nodes.iter_mut().find(|n| n.id == id)?.kind {
            NodeKind::TransformControl(control) => Some(control),
            _ => None,
        }
    }

    /// First visible transform control that is attached to a node
    pub fn active_transform_control(&self) -> Option<(&SceneNode, &TransformControl)> {
        self.nodes.iter().find_map(|n| match &n.kind {
            NodeKind::TransformControl(control) if n.visible && control.attached().is_some() => {
                Some((n, control))
            }
            _ => None,
        })
    }

    /// Union of the world bounds of all visible geometry
    pub fn bounds(&self) -> Option<Aabb> {
        self.nodes
            .iter()
            .filter(|n| n.visible)
            .filter_map(SceneNode::world_bounds)
            .reduce(|a, b| a.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_adds_lights_once() {
        let mut scene = SceneState::default();
        scene.setup();
        scene.setup();
        assert_eq!(scene.len(), 2);
        let sun = &scene.nodes()[0];
        assert_eq!(sun.transform.position, [5.0, 10.0, 3.0]);
        assert!(matches!(&sun.kind, NodeKind::Light(l) if l.intensity == 0.5));
    }

    #[test]
    fn test_visibility_bumps_version() {
        let mut scene = SceneState::default();
        let id = scene.add("p", NodeKind::Light(Light { kind: LightKind::Ambient, intensity: 1.0 }), Transform::new());
        let v = scene.version();
        assert!(scene.set_visible(&id, false));
        assert!(scene.version() > v);
        assert!(!scene.is_visible(&id));
        assert!(!scene.set_visible("missing", true));
    }

    #[test]
    fn test_remove() {
        let mut scene = SceneState::default();
        let id = scene.add("p", NodeKind::Light(Light { kind: LightKind::Ambient, intensity: 1.0 }), Transform::new());
        assert!(scene.remove(&id).is_some());
        assert!(scene.is_empty());
        assert!(scene.remove(&id).is_none());
    }

    #[test]
    fn test_get_mut_miss_keeps_version() {
        let mut scene = SceneState::default();
        let id = scene.add("p", NodeKind::Light(Light { kind: LightKind::Ambient, intensity: 1.0 }), Transform::new());
        let v = scene.version();
        assert!(scene.get_mut("missing").is_none());
        assert_eq!(scene.version(), v);

        scene.get_mut(&id).unwrap().transform.position = [1.0, 0.0, 0.0];
        assert_eq!(scene.version(), v + 1);
    }
}
