//! Collider shapes attached to physics objects
//!
//! A collider caches its world-space geometry. The owning object re-runs
//! [`Collider::transform`] every time its position changes, so geometry read
//! through an object is always current.

use crate::foundation::math::Vec3;
use super::intersect::{self, IntersectData};
use super::primitives::AABB;

/// Sphere collider (world space)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereCollider {
    position: Vec3,
    radius: f32,
}

impl SphereCollider {
    /// Creates a sphere collider with the given radius, centered at the origin until transformed
    pub fn new(radius: f32) -> Self {
        Self {
            position: Vec3::zeros(),
            radius,
        }
    }

    /// World-space center
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Sphere radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Bounding box of the sphere
    pub fn bounds(&self) -> AABB {
        AABB::from_center_extents(self.position, Vec3::repeat(self.radius))
    }
}

impl Default for SphereCollider {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Axis-aligned box collider (world space)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AabbCollider {
    centre: Vec3,
    extents: Vec3,
}

impl AabbCollider {
    /// Creates a box collider with the given half-size, centered at the origin until transformed
    pub fn new(extents: Vec3) -> Self {
        Self {
            centre: Vec3::zeros(),
            extents,
        }
    }

    /// World-space centre
    pub fn centre(&self) -> Vec3 {
        self.centre
    }

    /// Half-size along each axis
    pub fn extents(&self) -> Vec3 {
        self.extents
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.centre - self.extents
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.centre + self.extents
    }

    /// The box as a plain AABB
    pub fn bounds(&self) -> AABB {
        AABB::new(self.min(), self.max())
    }
}

impl Default for AabbCollider {
    fn default() -> Self {
        Self::new(Vec3::repeat(1.0))
    }
}

/// Collider variants
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Collider {
    /// No collision geometry; never reports a hit
    #[default]
    None,
    /// Sphere
    Sphere(SphereCollider),
    /// Axis-aligned box
    Aabb(AabbCollider),
}

impl Collider {
    /// Sphere collider with the given radius
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere(SphereCollider::new(radius))
    }

    /// Box collider with the given half-size
    pub fn aabb(extents: Vec3) -> Self {
        Self::Aabb(AabbCollider::new(extents))
    }

    /// Re-derive world-space geometry from the owning object's position
    pub fn transform(&mut self, position: Vec3) {
        match self {
            Self::None => {}
            Self::Sphere(sphere) => sphere.position = position,
            Self::Aabb(aabb) => aabb.centre = position,
        }
    }

    /// World-space bounds, `None` for [`Collider::None`]
    pub fn bounds(&self) -> Option<AABB> {
        match self {
            Self::None => None,
            Self::Sphere(sphere) => Some(sphere.bounds()),
            Self::Aabb(aabb) => Some(aabb.bounds()),
        }
    }

    /// Narrow-phase test against another collider
    ///
    /// The returned collision vector points from `self` toward `other`.
    pub fn intersects(&self, other: &Collider) -> Option<IntersectData> {
        match (self, other) {
            (Self::Sphere(a), Self::Sphere(b)) => intersect::sphere_sphere(a, b),
            (Self::Sphere(a), Self::Aabb(b)) => intersect::sphere_aabb(a, b),
            (Self::Aabb(a), Self::Sphere(b)) => intersect::aabb_sphere(a, b),
            (Self::Aabb(a), Self::Aabb(b)) => intersect::aabb_aabb(a, b),
            (Self::None, _) | (_, Self::None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_moves_geometry() {
        let mut sphere = Collider::sphere(0.5);
        sphere.transform(Vec3::new(1.0, 2.0, 3.0));
        let bounds = sphere.bounds().unwrap();
        assert_relative_eq!(bounds.min, Vec3::new(0.5, 1.5, 2.5));
        assert_relative_eq!(bounds.max, Vec3::new(1.5, 2.5, 3.5));

        let mut aabb = Collider::aabb(Vec3::new(1.0, 0.5, 2.0));
        aabb.transform(Vec3::new(-1.0, 0.0, 0.0));
        let bounds = aabb.bounds().unwrap();
        assert_relative_eq!(bounds.min, Vec3::new(-2.0, -0.5, -2.0));
        assert_relative_eq!(bounds.max, Vec3::new(0.0, 0.5, 2.0));
    }

    #[test]
    fn test_none_never_collides() {
        let mut none = Collider::None;
        none.transform(Vec3::zeros());
        let sphere = Collider::sphere(10.0);

        assert!(none.bounds().is_none());
        assert!(none.intersects(&sphere).is_none());
        assert!(sphere.intersects(&none).is_none());
    }
}
