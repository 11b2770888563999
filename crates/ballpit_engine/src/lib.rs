//! # Ball Pit Engine
//!
//! A fixed-timestep point-mass physics engine.
//!
//! ## Features
//!
//! - **Point Masses**: Semi-implicit Euler integration with drag, gravity and per-step global force
//! - **Colliders**: Spheres and axis-aligned boxes with exact narrow-phase tests
//! - **Springs**: Damped Hookean constraints between object pairs
//! - **Broad Phase**: Self-pruning octree, or exhaustive pair testing
//! - **Rigid Objects**: Immovable under collision, kinematic under forces
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ballpit_engine::prelude::*;
//!
//! fn main() -> Result<(), PhysicsError> {
//!     let mut scene = Scene::new(SceneConfig::new().with_ground_plane(0.5))?;
//!     let ball = scene.attach_object(
//!         PhysicsObject::new(Vec3::new(0.0, 5.0, 0.0))
//!             .with_collider(Collider::sphere(0.25))
//!             .with_bounciness(0.5),
//!     )?;
//!
//!     for _ in 0..120 {
//!         scene.fixed_update()?;
//!     }
//!     println!("ball at {:?}", scene.object(ball).map(PhysicsObject::position));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::config::{BroadPhaseKind, Config, ConfigError, SceneConfig},
        foundation::{
            collections::{ConstraintHandle, ObjectHandle},
            math::{Vec3, Vec4},
            time::{FixedTimestep, Stopwatch},
        },
        physics::{
            Collider, CollisionInfo, Constraint, ConstraintType, PhysicsError, PhysicsObject,
            PhysicsResult, RenderInfo, Scene, Spring, AABB,
        },
        spatial::{BroadPhase, BruteForce, Octree, OctreeConfig},
    };
}
