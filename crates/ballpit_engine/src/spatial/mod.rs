//! Broad-phase collision culling
//!
//! A broad phase owns the per-step pipeline for a scene's objects: it
//! integrates them, finds overlapping pairs and resolves those pairs.
//! Swapping the partitioning scheme never changes the scene.

mod brute_force;
mod octree;

use std::any::Any;

use crate::foundation::collections::ObjectHandle;
use crate::physics::resolution::CollisionInfo;
use crate::physics::step::{ObjectSet, StepEnvironment};

pub use brute_force::BruteForce;
pub use octree::{Octants, Octree, OctreeConfig, OctreeNode};

/// Interface shared by every broad-phase scheme
///
/// Implementations hold object handles only; the objects themselves stay in
/// the scene's [`ObjectSet`].
pub trait BroadPhase: Send + Sync {
    /// Queue an object for filing on the next update
    fn insert(&mut self, handle: ObjectHandle);

    /// Forget an object immediately; returns whether it was known
    fn remove(&mut self, handle: ObjectHandle) -> bool;

    /// Integrate every object, detect overlapping pairs and resolve them
    fn update(&mut self, objects: &mut ObjectSet, env: &StepEnvironment) -> &[CollisionInfo];

    /// Pairs found by the most recent update
    fn collisions(&self) -> &[CollisionInfo];

    /// Number of objects known, queued ones included
    fn object_count(&self) -> usize;

    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Downcast to Any for type-specific access (e.g. octree inspection)
    fn as_any(&self) -> &dyn Any;
}
