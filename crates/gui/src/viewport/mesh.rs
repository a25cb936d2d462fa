use std::collections::HashMap;

use glam::{EulerRot, Mat4, Quat, Vec3};
use shared::{ElementGeometry, ExpressId, Transform};

use super::picking::Aabb;

/// Lines mesh: interleaved [pos.x, pos.y, pos.z, r, g, b, a]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
}

impl LineMeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 7
    }

    /// Iterate line segments as (start, end, color)
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3, [f32; 4])> + '_ {
        self.vertices.chunks_exact(14).map(|s| {
            (
                Vec3::new(s[0], s[1], s[2]),
                Vec3::new(s[7], s[8], s[9]),
                [s[3], s[4], s[5], s[6]],
            )
        })
    }
}

/// World matrix of a scene node (scale, then XYZ Euler rotation, then translation)
pub fn node_matrix(t: &Transform) -> Mat4 {
    let rotation = Quat::from_euler(
        EulerRot::XYZ,
        t.rotation[0] as f32,
        t.rotation[1] as f32,
        t.rotation[2] as f32,
    );
    Mat4::from_scale_rotation_translation(
        Vec3::new(t.scale[0] as f32, t.scale[1] as f32, t.scale[2] as f32),
        rotation,
        Vec3::new(t.position[0] as f32, t.position[1] as f32, t.position[2] as f32),
    )
}

/// Bounds of all elements' positions
pub fn elements_bounds<'a>(elements: impl IntoIterator<Item = &'a ElementGeometry>) -> Option<Aabb> {
    elements
        .into_iter()
        .filter_map(|e| Aabb::from_positions(&e.positions))
        .reduce(|a, b| a.union(&b))
}

/// Axis-aligned box element, 12 triangles
pub fn box_element(express_id: ExpressId, min: [f32; 3], max: [f32; 3]) -> ElementGeometry {
    let [x0, y0, z0] = min;
    let [x1, y1, z1] = max;

    let faces: [[[f32; 3]; 4]; 6] = [
        // Front (+Z)
        [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]],
        // Back (-Z)
        [[x1, y0, z0], [x0, y0, z0], [x0, y1, z0], [x1, y1, z0]],
        // Right (+X)
        [[x1, y0, z1], [x1, y0, z0], [x1, y1, z0], [x1, y1, z1]],
        // Left (-X)
        [[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]],
        // Top (+Y)
        [[x0, y1, z1], [x1, y1, z1], [x1, y1, z0], [x0, y1, z0]],
        // Bottom (-Y)
        [[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]],
    ];

    let mut positions = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for quad in &faces {
        let base = positions.len() as u32;
        positions.extend_from_slice(quad);
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    ElementGeometry {
        express_id,
        positions,
        indices,
    }
}

/// Merge vertices with identical positions and drop the unused copies.
/// Returns the number of vertices removed.
pub fn weld_vertices(element: &mut ElementGeometry) -> usize {
    let before = element.positions.len();
    let mut lookup: HashMap<[u32; 3], u32> = HashMap::with_capacity(before);
    let mut positions = Vec::with_capacity(before);
    let mut remap = Vec::with_capacity(before);

    for p in &element.positions {
        let key = [p[0].to_bits(), p[1].to_bits(), p[2].to_bits()];
        let idx = *lookup.entry(key).or_insert_with(|| {
            positions.push(*p);
            (positions.len() - 1) as u32
        });
        remap.push(idx);
    }

    for i in element.indices.iter_mut() {
        if let Some(&new_idx) = remap.get(*i as usize) {
            *i = new_idx;
        }
    }
    element.positions = positions;
    before - element.positions.len()
}

/// Translate every position of an element
pub fn translate_element(element: &mut ElementGeometry, offset: Vec3) {
    for p in element.positions.iter_mut() {
        p[0] += offset.x;
        p[1] += offset.y;
        p[2] += offset.z;
    }
}
