//! Point-mass physics
//!
//! Objects are point masses carrying a collider for contact purposes only;
//! there is no orientation or angular motion. A [`Scene`] owns objects and
//! constraints and advances them with a fixed timestep.
//!
//! # Module Organization
//!
//! - [`object`] - [`PhysicsObject`] state and per-step integration
//! - [`collision`] - Colliders and narrow-phase intersection tests
//! - [`constraint`] - Spring constraints between object pairs
//! - [`resolution`] - Impulse response for detected pairs
//! - [`step`] - Scene-wide inputs to one integration step
//! - [`scene`] - The owning [`Scene`]
//! - [`error`] - [`PhysicsError`]

pub mod collision;
pub mod constraint;
pub mod error;
pub mod object;
pub mod resolution;
pub mod scene;
pub mod step;

#[cfg(test)]
mod tests;

pub use collision::{Collider, CollisionType, IntersectData, AABB};
pub use constraint::{Constraint, ConstraintKind, ConstraintType, Spring};
pub use error::{PhysicsError, PhysicsResult};
pub use object::{PhysicsObject, MOVEMENT_EPSILON};
pub use resolution::CollisionInfo;
pub use scene::{RenderInfo, Scene};
pub use step::{ObjectSet, StepEnvironment};
