//! Handle types and handle-keyed collections
//!
//! Everything the engine hands out to collaborators is a generational
//! `slotmap` key, so a handle to a removed object can never alias a newer one.

pub use slotmap::{SecondaryMap, SlotMap};

slotmap::new_key_type! {
    /// Stable identity of a physics object owned by a scene
    pub struct ObjectHandle;

    /// Stable identity of a constraint owned by a scene
    pub struct ConstraintHandle;

    /// Index of a node inside the octree arena
    pub struct NodeId;
}
