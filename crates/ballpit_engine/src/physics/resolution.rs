//! Impulse-based collision response

use crate::foundation::collections::ObjectHandle;
use super::collision::IntersectData;
use super::step::ObjectSet;

/// One detected overlap between two objects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// First object; the collision vector points away from it
    pub object_a: ObjectHandle,
    /// Second object
    pub object_b: ObjectHandle,
    /// Narrow-phase result for the pair
    pub data: IntersectData,
}

impl CollisionInfo {
    /// Pair record
    pub fn new(object_a: ObjectHandle, object_b: ObjectHandle, data: IntersectData) -> Self {
        Self { object_a, object_b, data }
    }

    /// Whether the pair involves `handle`
    pub fn involves(&self, handle: ObjectHandle) -> bool {
        self.object_a == handle || self.object_b == handle
    }
}

/// Narrow-phase test between two stored objects
///
/// `None` when either handle is stale or the colliders do not overlap.
pub fn test_pair(objects: &ObjectSet, a: ObjectHandle, b: ObjectHandle) -> Option<CollisionInfo> {
    let object_a = objects.get(a)?;
    let object_b = objects.get(b)?;
    object_a
        .collider()
        .intersects(object_b.collider())
        .map(|data| CollisionInfo::new(a, b, data))
}

/// Resolve every collision in order
///
/// Velocities change only for pairs approaching along the collision normal;
/// positional separation is always applied. Rigid objects are never written.
pub fn resolve_collisions(objects: &mut ObjectSet, collisions: &[CollisionInfo]) {
    for collision in collisions {
        resolve(objects, collision);
    }
}

fn resolve(objects: &mut ObjectSet, collision: &CollisionInfo) {
    let (Some(a), Some(b)) = (objects.get(collision.object_a), objects.get(collision.object_b)) else {
        return;
    };
    if a.is_rigid() && b.is_rigid() {
        return;
    }
    let Some(normal) = collision.data.normal() else {
        return;
    };

    let vector = collision.data.collision_vector;
    let restitution = a.bounciness().min(b.bounciness());
    let (velocity_a, velocity_b) = (a.velocity(), b.velocity());
    let approach = (velocity_a - velocity_b).dot(&normal);
    let (rigid_a, rigid_b) = (a.is_rigid(), b.is_rigid());
    let (mass_a, mass_b) = (a.mass(), b.mass());

    if rigid_a || rigid_b {
        // Only the dynamic side moves; it reflects off the rigid side and
        // takes the whole separation.
        let (dynamic, offset, dynamic_velocity, rigid_velocity) = if rigid_a {
            (collision.object_b, vector, velocity_b, velocity_a)
        } else {
            (collision.object_a, -vector, velocity_a, velocity_b)
        };
        if let Some(object) = objects.get_mut(dynamic) {
            if approach > 0.0 {
                let reflected = dynamic_velocity
                    - normal * (1.0 + restitution) * (dynamic_velocity - rigid_velocity).dot(&normal);
                object.set_velocity(reflected);
            }
            object.set_position(object.position() + offset);
        }
        return;
    }

    let impulse = normal * (1.0 + restitution) * approach / (1.0 / mass_a + 1.0 / mass_b);
    let half = vector * 0.5;
    if let Some(object) = objects.get_mut(collision.object_a) {
        if approach > 0.0 {
            object.set_velocity(velocity_a - impulse / mass_a);
        }
        object.set_position(object.position() - half);
    }
    if let Some(object) = objects.get_mut(collision.object_b) {
        if approach > 0.0 {
            object.set_velocity(velocity_b + impulse / mass_b);
        }
        object.set_position(object.position() + half);
    }
}
