//! Pairwise constraints between physics objects
//!
//! Constraints are per-step force generators. They hold handles to the two
//! objects they connect and carry no state beyond their configuration; the
//! objects themselves are unaware of any constraint attached to them.

use serde::{Deserialize, Serialize};

use crate::foundation::collections::ObjectHandle;
use crate::foundation::math::Vec3;
use super::error::{PhysicsError, PhysicsResult};
use super::step::ObjectSet;

/// Constraint kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintType {
    /// Damped Hookean spring
    Spring,
    /// Rigid joint (declared, no solver yet)
    Joint,
}

/// Spring parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    /// Separation at which the spring exerts no restoring force
    pub rest_length: f32,
    /// Force per unit of stretch
    pub stiffness: f32,
    /// Damping applied to relative velocity along the spring axis
    pub damping: f32,
}

impl Default for Spring {
    fn default() -> Self {
        Self {
            rest_length: 5.0,
            stiffness: 100.0,
            damping: 1.0,
        }
    }
}

impl Spring {
    /// Spring with explicit parameters
    pub fn new(rest_length: f32, stiffness: f32, damping: f32) -> Self {
        Self { rest_length, stiffness, damping }
    }

    /// Force to apply to the first endpoint (the second receives its negation)
    ///
    /// Zero when the endpoints coincide or sit exactly at rest length.
    pub fn force(&self, position_a: Vec3, velocity_a: Vec3, position_b: Vec3, velocity_b: Vec3) -> Vec3 {
        let separation = position_b - position_a;
        let length = separation.norm();
        if length == 0.0 || approx::abs_diff_eq!(length, self.rest_length) {
            return Vec3::zeros();
        }

        let direction = separation / length;
        let restoring = direction * (length - self.rest_length) * self.stiffness;
        let damping = direction * (velocity_b - velocity_a).dot(&separation) * self.damping;
        restoring + damping
    }
}

/// Kind-specific constraint data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintKind {
    /// Spring with its parameters
    Spring(Spring),
    /// Joint
    Joint,
}

/// A constraint connecting two objects
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    object_a: ObjectHandle,
    object_b: ObjectHandle,
    kind: ConstraintKind,
}

impl Constraint {
    /// Spring between two objects
    pub fn spring(object_a: ObjectHandle, object_b: ObjectHandle, spring: Spring) -> Self {
        Self {
            object_a,
            object_b,
            kind: ConstraintKind::Spring(spring),
        }
    }

    /// Joint between two objects
    ///
    /// Joints cannot be simulated yet; attaching one to a scene fails with
    /// [`PhysicsError::UnsupportedConstraint`].
    pub fn joint(object_a: ObjectHandle, object_b: ObjectHandle) -> Self {
        Self {
            object_a,
            object_b,
            kind: ConstraintKind::Joint,
        }
    }

    /// The two connected objects
    pub fn connections(&self) -> (ObjectHandle, ObjectHandle) {
        (self.object_a, self.object_b)
    }

    /// Whether the constraint references `handle`
    pub fn connects(&self, handle: ObjectHandle) -> bool {
        self.object_a == handle || self.object_b == handle
    }

    /// Type tag
    pub fn constraint_type(&self) -> ConstraintType {
        match self.kind {
            ConstraintKind::Spring(_) => ConstraintType::Spring,
            ConstraintKind::Joint => ConstraintType::Joint,
        }
    }

    /// Kind-specific data
    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    /// Mutable kind-specific data, for tuning a live spring
    pub fn kind_mut(&mut self) -> &mut ConstraintKind {
        &mut self.kind
    }

    /// Check the constraint can be simulated against `objects`
    pub fn validate(&self, objects: &ObjectSet) -> PhysicsResult<()> {
        if let ConstraintKind::Joint = self.kind {
            return Err(PhysicsError::UnsupportedConstraint(ConstraintType::Joint));
        }
        if self.object_a == self.object_b {
            return Err(PhysicsError::SelfConnection(self.object_a));
        }
        for handle in [self.object_a, self.object_b] {
            if !objects.contains_key(handle) {
                return Err(PhysicsError::MissingObject(handle));
            }
        }
        Ok(())
    }

    /// Apply this step's forces to both endpoints
    ///
    /// Rigid endpoints are skipped, they do not respond to forces.
    pub fn fixed_update(&self, objects: &mut ObjectSet) -> PhysicsResult<()> {
        let spring = match self.kind {
            ConstraintKind::Spring(spring) => spring,
            ConstraintKind::Joint => return Err(PhysicsError::UnsupportedConstraint(ConstraintType::Joint)),
        };

        let force = {
            let a = objects.get(self.object_a).ok_or(PhysicsError::MissingObject(self.object_a))?;
            let b = objects.get(self.object_b).ok_or(PhysicsError::MissingObject(self.object_b))?;
            spring.force(a.position(), a.velocity(), b.position(), b.velocity())
        };

        if let Some(a) = objects.get_mut(self.object_a).filter(|object| !object.is_rigid()) {
            a.apply_force(force);
        }
        if let Some(b) = objects.get_mut(self.object_b).filter(|object| !object.is_rigid()) {
            b.apply_force(-force);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::object::PhysicsObject;
    use approx::assert_relative_eq;

    fn pair(a: Vec3, b: Vec3) -> (ObjectSet, ObjectHandle, ObjectHandle) {
        let mut objects = ObjectSet::with_key();
        let ha = objects.insert(PhysicsObject::new(a));
        let hb = objects.insert(PhysicsObject::new(b));
        (objects, ha, hb)
    }

    #[test]
    fn test_spring_defaults() {
        let spring = Spring::default();
        assert_eq!(spring.rest_length, 5.0);
        assert_eq!(spring.stiffness, 100.0);
        assert_eq!(spring.damping, 1.0);
    }

    #[test]
    fn test_spring_at_rest_length_applies_no_force() {
        let (mut objects, a, b) = pair(Vec3::zeros(), Vec3::new(0.0, 0.0, 5.0));
        Constraint::spring(a, b, Spring::default()).fixed_update(&mut objects).unwrap();

        assert_relative_eq!(objects[a].acceleration(), Vec3::zeros());
        assert_relative_eq!(objects[b].acceleration(), Vec3::zeros());
    }

    #[test]
    fn test_stretched_spring_pulls_endpoints_together() {
        let (mut objects, a, b) = pair(Vec3::zeros(), Vec3::new(6.0, 0.0, 0.0));
        Constraint::spring(a, b, Spring::default()).fixed_update(&mut objects).unwrap();

        assert_relative_eq!(objects[a].acceleration(), Vec3::new(100.0, 0.0, 0.0));
        assert_relative_eq!(objects[b].acceleration(), Vec3::new(-100.0, 0.0, 0.0));
    }

    #[test]
    fn test_compressed_spring_pushes_endpoints_apart() {
        let (mut objects, a, b) = pair(Vec3::zeros(), Vec3::new(0.0, 4.0, 0.0));
        Constraint::spring(a, b, Spring::new(5.0, 10.0, 0.0)).fixed_update(&mut objects).unwrap();

        assert_relative_eq!(objects[a].acceleration(), Vec3::new(0.0, -10.0, 0.0));
        assert_relative_eq!(objects[b].acceleration(), Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_damping_follows_separation_velocity() {
        let spring = Spring::new(1.0, 0.0, 0.5);
        let force = spring.force(
            Vec3::zeros(),
            Vec3::zeros(),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        );
        // dot((1,0,0), (2,0,0)) * x * 0.5
        assert_relative_eq!(force, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_damping_skipped_at_rest_length() {
        let spring = Spring::new(2.0, 0.0, 0.5);
        let force = spring.force(
            Vec3::zeros(),
            Vec3::zeros(),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        );
        assert_relative_eq!(force, Vec3::zeros());
    }

    #[test]
    fn test_coincident_endpoints_apply_no_force() {
        let spring = Spring::default();
        let force = spring.force(Vec3::zeros(), Vec3::x(), Vec3::zeros(), Vec3::zeros());
        assert_relative_eq!(force, Vec3::zeros());
    }

    #[test]
    fn test_validate() {
        let (objects, a, b) = pair(Vec3::zeros(), Vec3::x());
        assert!(Constraint::spring(a, b, Spring::default()).validate(&objects).is_ok());
        assert_eq!(
            Constraint::joint(a, b).validate(&objects),
            Err(PhysicsError::UnsupportedConstraint(ConstraintType::Joint))
        );
        assert_eq!(
            Constraint::spring(a, a, Spring::default()).validate(&objects),
            Err(PhysicsError::SelfConnection(a))
        );

        let mut shrunk = objects.clone();
        shrunk.remove(b);
        assert_eq!(
            Constraint::spring(a, b, Spring::default()).validate(&shrunk),
            Err(PhysicsError::MissingObject(b))
        );
    }

    #[test]
    fn test_rigid_endpoint_receives_no_force() {
        let (mut objects, a, b) = pair(Vec3::zeros(), Vec3::new(7.0, 0.0, 0.0));
        objects[a].set_rigid(true);
        Constraint::spring(a, b, Spring::default()).fixed_update(&mut objects).unwrap();

        assert_relative_eq!(objects[a].acceleration(), Vec3::zeros());
        assert_relative_eq!(objects[b].acceleration(), Vec3::new(-200.0, 0.0, 0.0));
    }
}
