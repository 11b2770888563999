//! Exhaustive pairwise broad phase

use std::any::Any;

use log::trace;

use crate::foundation::collections::ObjectHandle;
use crate::foundation::time::Stopwatch;
use crate::physics::resolution::{resolve_collisions, test_pair, CollisionInfo};
use crate::physics::step::{ObjectSet, StepEnvironment};
use super::BroadPhase;

/// Tests every unordered pair once per step
///
/// Quadratic, but trivially correct; useful for small scenes and as a
/// reference for the octree.
#[derive(Debug, Default)]
pub struct BruteForce {
    handles: Vec<ObjectHandle>,
    pairs: Vec<CollisionInfo>,
}

impl BruteForce {
    /// Create an empty broad phase
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects in insertion order
    pub fn handles(&self) -> &[ObjectHandle] {
        &self.handles
    }
}

impl BroadPhase for BruteForce {
    fn insert(&mut self, handle: ObjectHandle) {
        if !self.handles.contains(&handle) {
            self.handles.push(handle);
        }
    }

    fn remove(&mut self, handle: ObjectHandle) -> bool {
        let before = self.handles.len();
        self.handles.retain(|&held| held != handle);
        self.pairs.retain(|pair| !pair.involves(handle));
        self.handles.len() != before
    }

    fn update(&mut self, objects: &mut ObjectSet, env: &StepEnvironment) -> &[CollisionInfo] {
        self.handles.retain(|&handle| objects.contains_key(handle));
        for &handle in &self.handles {
            if let Some(object) = objects.get_mut(handle) {
                env.integrate(object);
            }
        }

        self.pairs.clear();
        let timer = Stopwatch::start_new();
        for (index, &a) in self.handles.iter().enumerate() {
            for &b in &self.handles[index + 1..] {
                self.pairs.extend(test_pair(objects, a, b));
            }
        }
        let detect_ms = timer.elapsed_millis();

        let timer = Stopwatch::start_new();
        resolve_collisions(objects, &self.pairs);
        trace!(
            "Brute-force step: {} pairs, detect {:.3}ms, resolve {:.3}ms",
            self.pairs.len(),
            detect_ms,
            timer.elapsed_millis()
        );

        &self.pairs
    }

    fn collisions(&self) -> &[CollisionInfo] {
        &self.pairs
    }

    fn object_count(&self) -> usize {
        self.handles.len()
    }

    fn name(&self) -> &'static str {
        "brute-force"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::physics::collision::Collider;
    use crate::physics::object::PhysicsObject;

    fn env() -> StepEnvironment {
        StepEnvironment {
            dt: 1.0 / 60.0,
            gravity: Vec3::zeros(),
            global_force: Vec3::zeros(),
            ground_plane: None,
        }
    }

    #[test]
    fn test_each_pair_reported_once() {
        let mut objects = ObjectSet::with_key();
        let mut broad_phase = BruteForce::new();
        for x in [0.0, 0.5, 1.0] {
            let handle = objects.insert(PhysicsObject::new(Vec3::new(x, 0.0, 0.0)).with_collider(Collider::sphere(1.0)));
            broad_phase.insert(handle);
            broad_phase.insert(handle);
        }

        let pairs = broad_phase.update(&mut objects, &env());
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_removed_objects_are_skipped() {
        let mut objects = ObjectSet::with_key();
        let mut broad_phase = BruteForce::new();
        let a = objects.insert(PhysicsObject::new(Vec3::zeros()).with_collider(Collider::sphere(1.0)));
        let b = objects.insert(PhysicsObject::new(Vec3::x()).with_collider(Collider::sphere(1.0)));
        broad_phase.insert(a);
        broad_phase.insert(b);

        assert!(broad_phase.remove(b));
        assert!(!broad_phase.remove(b));
        assert!(broad_phase.update(&mut objects, &env()).is_empty());
        assert_eq!(broad_phase.object_count(), 1);
    }
}
