//! Primitive geometric types
//!
//! The axis-aligned box here is shared by the box collider, the bounds every
//! collider reports to the broad phase, and the octree's node regions.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Vec3};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents (half-size)
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Zero-volume box at a single point
    pub fn point(position: Vec3) -> Self {
        Self::new(position, position)
    }

    /// Smallest box enclosing every box in `boxes`, or `None` when empty
    pub fn enclosing<'a>(boxes: impl IntoIterator<Item = &'a AABB>) -> Option<Self> {
        boxes.into_iter().fold(None, |acc: Option<Self>, b| {
            Some(acc.map_or(*b, |a| Self::new(a.min.inf(&b.min), a.max.sup(&b.max))))
        })
    }

    /// Cube anchored at this box's min corner whose side is the next power of
    /// two at or above the longest side
    pub fn enclosing_cube(&self) -> Self {
        let size = self.size();
        let side = utils::next_power_of_two(size.x.max(size.y).max(size.z));
        Self::new(self.min, self.min + Vec3::repeat(side))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Full edge lengths
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// True when the box has no volume along any axis
    pub fn is_degenerate(&self) -> bool {
        let size = self.size();
        size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if `other` lies entirely inside this box (shared faces count)
    pub fn contains(&self, other: &AABB) -> bool {
        other.min.x >= self.min.x && other.max.x <= self.max.x &&
        other.min.y >= self.min.y && other.max.y <= self.max.y &&
        other.min.z >= self.min.z && other.max.z <= self.max.z
    }

    /// Check if this AABB overlaps another AABB (touching counts)
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Closest point inside the box to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        utils::clamp_vec(point, self.min, self.max)
    }

    /// Region of octant `index` (0-7)
    ///
    /// Octant layout:
    /// - bit 0 set: +X half
    /// - bit 1 set: +Y half
    /// - bit 2 set: +Z half
    pub fn octant(&self, index: usize) -> Self {
        let center = self.center();
        let mut min = self.min;
        let mut max = center;
        for axis in 0..3 {
            if index & (1 << axis) != 0 {
                min[axis] = center[axis];
                max[axis] = self.max[axis];
            }
        }
        Self::new(min, max)
    }

    /// Index of the octant that fully contains `bounds`, if any
    ///
    /// Returns `None` when `bounds` straddles one of the splitting planes.
    /// Callers are expected to have checked that this box contains `bounds`.
    pub fn octant_containing(&self, bounds: &AABB) -> Option<usize> {
        let center = self.center();
        let mut index = 0;
        for axis in 0..3 {
            if bounds.min[axis] >= center[axis] {
                index |= 1 << axis;
            } else if bounds.max[axis] > center[axis] {
                return None;
            }
        }
        Some(index)
    }
}
