use glam::{Mat4, Vec3};
use shared::ElementGeometry;

/// A ray in world space
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Move the ray into another space. The direction is not renormalized, so
    /// hit distances stay comparable with world-space distances.
    pub fn transformed(&self, m: &Mat4) -> Ray {
        Ray {
            origin: m.transform_point3(self.origin),
            direction: m.transform_vector3(self.direction),
        }
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    /// Bounds of a set of positions, `None` when there are none
    pub fn from_positions(positions: &[[f32; 3]]) -> Option<Self> {
        let mut aabb = Self::EMPTY;
        for p in positions {
            aabb.extend(Vec3::from_array(*p));
        }
        aabb.is_valid().then_some(aabb)
    }

    pub fn extend(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Bounds of this box after a transform (all 8 corners)
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        let mut out = Self::EMPTY;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.extend(m.transform_point3(corner));
        }
        out
    }

    /// Center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Ray-AABB intersection using the slab method.
/// Returns the distance along the ray to the nearest hit, or None.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let inv_dir = Vec3::new(
        1.0 / ray.direction.x,
        1.0 / ray.direction.y,
        1.0 / ray.direction.z,
    );

    let t1 = (aabb.min.x - ray.origin.x) * inv_dir.x;
    let t2 = (aabb.max.x - ray.origin.x) * inv_dir.x;
    let t3 = (aabb.min.y - ray.origin.y) * inv_dir.y;
    let t4 = (aabb.max.y - ray.origin.y) * inv_dir.y;
    let t5 = (aabb.min.z - ray.origin.z) * inv_dir.z;
    let t6 = (aabb.max.z - ray.origin.z) * inv_dir.z;

    let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
    let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Möller-Trumbore ray-triangle intersection algorithm.
/// Returns the distance along the ray if hit, or None if no intersection.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection is behind ray origin
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Nearest hit distance between a local-space ray and an element's triangles.
pub fn pick_element(ray: &Ray, element: &ElementGeometry) -> Option<f32> {
    if !element.has_geometry() {
        return None;
    }
    let bounds = Aabb::from_positions(&element.positions)?;
    ray_aabb(ray, &bounds)?;

    let pos = |i: u32| element.positions.get(i as usize).map(|p| Vec3::from_array(*p));
    let mut best: Option<f32> = None;

    for tri in element.indices.chunks_exact(3) {
        let (Some(v0), Some(v1), Some(v2)) = (pos(tri[0]), pos(tri[1]), pos(tri[2])) else {
            continue;
        };
        if let Some(dist) = ray_triangle_intersect(ray, v0, v1, v2) {
            if best.is_none_or(|d| dist < d) {
                best = Some(dist);
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::mesh::box_element;

    #[test]
    fn test_ray_hits_box_front_face() {
        let element = box_element(1, [-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let dist = pick_element(&ray, &element).unwrap();
        assert!((dist - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_misses_box() {
        let element = box_element(1, [-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]);
        let ray = Ray::new(Vec3::new(5.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(pick_element(&ray, &element).is_none());
    }

    #[test]
    fn test_ray_behind_origin_misses() {
        let element = box_element(1, [-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert!(pick_element(&ray, &element).is_none());
    }

    #[test]
    fn test_transformed_ray_keeps_world_distance() {
        let element = box_element(1, [-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]);
        let world = Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0));
        let ray = Ray::new(Vec3::new(3.0, 0.0, 10.0), Vec3::NEG_Z);
        let local = ray.transformed(&world.inverse());
        let dist = pick_element(&local, &element).unwrap();
        assert!((dist - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_aabb_transformed_rotation() {
        let aabb = Aabb {
            min: Vec3::new(0.0, 0.0, 0.0),
            max: Vec3::new(1.0, 2.0, 3.0),
        };
        let rot = Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2);
        let out = aabb.transformed(&rot);
        assert!((out.size().y - 3.0).abs() < 1e-5);
        assert!((out.size().z - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_positions_have_no_bounds() {
        assert!(Aabb::from_positions(&[]).is_none());
    }
}
