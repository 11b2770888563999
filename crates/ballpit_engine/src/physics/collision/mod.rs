//! Collision geometry and narrow-phase detection
//!
//! # Module Organization
//!
//! - [`primitives`] - The [`AABB`] value type shared with the broad phase
//! - [`collider`] - Collider shapes attached to physics objects
//! - [`intersect`] - Pairwise intersection tests and their results
//!
//! # Key Types
//!
//! - [`Collider`] - Sum type over {None, Sphere, Aabb}, owned by an object
//! - [`IntersectData`] - Penetration vector plus the pairing that produced it

pub mod primitives;
pub mod collider;
pub mod intersect;

// Re-export commonly used types
pub use primitives::AABB;
pub use collider::{AabbCollider, Collider, SphereCollider};
pub use intersect::{CollisionType, IntersectData};
