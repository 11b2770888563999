//! Physics error types

use thiserror::Error;

use crate::foundation::collections::ObjectHandle;
use super::constraint::ConstraintType;

/// Errors raised by the simulation core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Mass must be finite and strictly positive
    #[error("Invalid mass {0}: mass must be finite and greater than zero")]
    InvalidMass(f32),

    /// A constraint kind that has no solver
    #[error("Constraint type {0:?} is not implemented")]
    UnsupportedConstraint(ConstraintType),

    /// A constraint refers to an object the scene does not own
    #[error("Object {0:?} is not attached to the scene")]
    MissingObject(ObjectHandle),

    /// A constraint connects an object to itself
    #[error("Constraint connects object {0:?} to itself")]
    SelfConnection(ObjectHandle),

    /// Scene configuration failed validation
    #[error("Invalid scene configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for physics operations
pub type PhysicsResult<T> = Result<T, PhysicsError>;
