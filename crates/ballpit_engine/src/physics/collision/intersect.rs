//! Narrow-phase intersection tests
//!
//! Every test is a pure function of two world-space colliders. On a hit the
//! collision vector points from the first shape toward the second and its
//! length is the penetration depth, so moving the second shape by the full
//! vector (or the first by its negation) separates them. Touching shapes do
//! not count as colliding.

use crate::foundation::math::{utils, Vec3, EPSILON};
use super::collider::{AabbCollider, SphereCollider};

/// Which pairing produced an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionType {
    /// Sphere against sphere
    SphereSphere,
    /// Sphere (first) against box (second)
    SphereAabb,
    /// Box (first) against sphere (second)
    AabbSphere,
    /// Box against box
    AabbAabb,
}

/// Result of a successful narrow-phase test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectData {
    /// Separation direction (first shape toward second) scaled by penetration depth
    pub collision_vector: Vec3,
    /// Pairing that produced this result
    pub kind: CollisionType,
}

impl IntersectData {
    /// Create intersection data
    pub fn new(collision_vector: Vec3, kind: CollisionType) -> Self {
        Self { collision_vector, kind }
    }

    /// Overlap amount
    pub fn penetration_depth(&self) -> f32 {
        self.collision_vector.norm()
    }

    /// Unit collision normal, `None` for a zero-length vector
    pub fn normal(&self) -> Option<Vec3> {
        self.collision_vector.try_normalize(EPSILON)
    }
}

/// Sphere against sphere
///
/// Coincident centres have no defined direction; they separate along +Y.
pub fn sphere_sphere(a: &SphereCollider, b: &SphereCollider) -> Option<IntersectData> {
    let offset = b.position() - a.position();
    let distance = offset.norm();
    let radius_sum = a.radius() + b.radius();

    if distance >= radius_sum {
        return None;
    }

    let normal = utils::normalize_or(offset, Vec3::y());
    Some(IntersectData::new(normal * (radius_sum - distance), CollisionType::SphereSphere))
}

/// Sphere (first) against box (second)
pub fn sphere_aabb(sphere: &SphereCollider, aabb: &AabbCollider) -> Option<IntersectData> {
    let centre = sphere.position();
    let radius = sphere.radius();
    let closest = aabb.bounds().closest_point(centre);
    let offset = closest - centre;
    let distance = offset.norm();

    let vector = if distance > EPSILON {
        if distance >= radius {
            return None;
        }
        offset / distance * (radius - distance)
    } else {
        // Centre is inside the box: leave through the nearest face.
        let (axis, exit_sign, face_distance) = nearest_face(centre, aabb);
        let mut normal = Vec3::zeros();
        normal[axis] = -exit_sign;
        normal * (radius + face_distance)
    };

    Some(IntersectData::new(vector, CollisionType::SphereAabb))
}

/// Box (first) against sphere (second)
pub fn aabb_sphere(aabb: &AabbCollider, sphere: &SphereCollider) -> Option<IntersectData> {
    sphere_aabb(sphere, aabb)
        .map(|hit| IntersectData::new(-hit.collision_vector, CollisionType::AabbSphere))
}

/// Box against box
///
/// Slab overlap on all three axes; the vector is the minimum translation
/// that pushes `b` out of `a`.
pub fn aabb_aabb(a: &AabbCollider, b: &AabbCollider) -> Option<IntersectData> {
    let (a_min, a_max) = (a.min(), a.max());
    let (b_min, b_max) = (b.min(), b.max());

    let mut best: Option<(usize, f32)> = None;
    for axis in 0..3 {
        let push_positive = a_max[axis] - b_min[axis];
        let push_negative = b_max[axis] - a_min[axis];
        if push_positive <= 0.0 || push_negative <= 0.0 {
            return None;
        }

        let signed_depth = if push_positive <= push_negative { push_positive } else { -push_negative };
        if best.map_or(true, |(_, depth)| signed_depth.abs() < depth.abs()) {
            best = Some((axis, signed_depth));
        }
    }

    best.map(|(axis, depth)| {
        let mut vector = Vec3::zeros();
        vector[axis] = depth;
        IntersectData::new(vector, CollisionType::AabbAabb)
    })
}

/// Axis, outward sign and distance of the box face nearest to an interior point
fn nearest_face(point: Vec3, aabb: &AabbCollider) -> (usize, f32, f32) {
    let (min, max) = (aabb.min(), aabb.max());
    let mut nearest = (1, 1.0, f32::INFINITY);
    for axis in 0..3 {
        let to_max = max[axis] - point[axis];
        let to_min = point[axis] - min[axis];
        if to_max < nearest.2 {
            nearest = (axis, 1.0, to_max);
        }
        if to_min < nearest.2 {
            nearest = (axis, -1.0, to_min);
        }
    }
    nearest
}
