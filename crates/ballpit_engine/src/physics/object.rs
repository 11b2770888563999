//! Point-mass physics objects

use crate::foundation::math::Vec3;
use super::collision::{Collider, AABB};
use super::error::{PhysicsError, PhysicsResult};

/// Per-axis drift that counts as "moved" for spatial re-filing
pub const MOVEMENT_EPSILON: f32 = 0.1;

/// A point mass with an attached collider
///
/// Acceleration is a per-step accumulator: forces land in it through
/// [`PhysicsObject::apply_force`] and it is cleared by every
/// [`PhysicsObject::fixed_update`].
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsObject {
    position: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    mass: f32,
    friction: f32,
    bounciness: f32,
    rigid: bool,
    collider: Collider,
    /// Position when movement was last reported
    reported_position: Vec3,
}

impl Default for PhysicsObject {
    fn default() -> Self {
        Self::new(Vec3::zeros())
    }
}

impl PhysicsObject {
    /// Create an object at `position` with mass 1, friction 1, bounciness 1 and no collider
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            mass: 1.0,
            friction: 1.0,
            bounciness: 1.0,
            rigid: false,
            collider: Collider::None,
            reported_position: position,
        }
    }

    /// Attach a collider, transformed to the current position
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.set_collider(collider);
        self
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the mass without validation; the scene rejects bad masses on attach
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// Set the drag coefficient
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Set the restitution coefficient
    pub fn with_bounciness(mut self, bounciness: f32) -> Self {
        self.bounciness = bounciness;
        self
    }

    /// Mark the object immovable by collisions
    pub fn with_rigid(mut self, rigid: bool) -> Self {
        self.rigid = rigid;
        self
    }

    /// Advance one fixed step
    ///
    /// Returns `true` when the object has drifted more than
    /// [`MOVEMENT_EPSILON`] on any axis since it last reported movement.
    /// Rigid objects are kinematic: accumulated forces and drag are
    /// discarded and they coast on their own velocity.
    pub fn fixed_update(&mut self, dt: f32) -> bool {
        if !self.rigid {
            self.apply_force(-self.velocity * self.friction);
            self.velocity += self.acceleration * dt;
        }
        self.position += self.velocity * dt;
        self.acceleration = Vec3::zeros();
        self.collider.transform(self.position);

        let drift = (self.position - self.reported_position).abs();
        let moved = drift.x > MOVEMENT_EPSILON || drift.y > MOVEMENT_EPSILON || drift.z > MOVEMENT_EPSILON;
        if moved {
            self.reported_position = self.position;
        }
        moved
    }

    /// Accumulate a force; several calls in one step add up
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force / self.mass;
    }

    /// Accumulate an acceleration directly (mass independent, e.g. gravity)
    pub fn add_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration += acceleration;
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Velocity
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Acceleration accumulated so far this step
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Mass
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Drag coefficient
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Restitution coefficient
    pub fn bounciness(&self) -> f32 {
        self.bounciness
    }

    /// Whether collisions leave this object untouched
    pub fn is_rigid(&self) -> bool {
        self.rigid
    }

    /// Attached collider, already in world space
    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    /// Collider bounds, or a point at the position for [`Collider::None`]
    pub fn bounds(&self) -> AABB {
        self.collider.bounds().unwrap_or_else(|| AABB::point(self.position))
    }

    /// Move the object; the collider follows
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.collider.transform(position);
    }

    /// Set velocity
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    /// Overwrite the acceleration accumulator
    pub fn set_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration = acceleration;
    }

    /// Set mass, rejecting zero, negative or non-finite values
    pub fn set_mass(&mut self, mass: f32) -> PhysicsResult<()> {
        validate_mass(mass)?;
        self.mass = mass;
        Ok(())
    }

    /// Set drag coefficient
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    /// Set restitution coefficient
    pub fn set_bounciness(&mut self, bounciness: f32) {
        self.bounciness = bounciness;
    }

    /// Set whether collisions leave this object untouched
    pub fn set_rigid(&mut self, rigid: bool) {
        self.rigid = rigid;
    }

    /// Replace the collider; the new one is transformed to the current position
    pub fn set_collider(&mut self, mut collider: Collider) {
        collider.transform(self.position);
        self.collider = collider;
    }
}

/// Mass must be finite and strictly positive
pub(crate) fn validate_mass(mass: f32) -> PhysicsResult<()> {
    if mass.is_finite() && mass > 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::InvalidMass(mass))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_defaults() {
        let object = PhysicsObject::default();
        assert_eq!(object.mass(), 1.0);
        assert_eq!(object.friction(), 1.0);
        assert_eq!(object.bounciness(), 1.0);
        assert!(!object.is_rigid());
        assert_eq!(*object.collider(), Collider::None);
    }

    #[test]
    fn test_forces_accumulate_and_clear() {
        let mut object = PhysicsObject::default().with_mass(2.0).with_friction(0.0);
        object.apply_force(Vec3::new(2.0, 0.0, 0.0));
        object.apply_force(Vec3::new(0.0, 4.0, 0.0));
        assert_relative_eq!(object.acceleration(), Vec3::new(1.0, 2.0, 0.0));

        object.fixed_update(DT);
        assert_relative_eq!(object.acceleration(), Vec3::zeros());
        assert_relative_eq!(object.velocity(), Vec3::new(DT, 2.0 * DT, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_drag_decays_speed_monotonically() {
        let mut object = PhysicsObject::new(Vec3::zeros()).with_velocity(Vec3::new(3.0, 0.0, -1.0));
        let mut previous_speed = object.velocity().norm();
        let mut previous_position = object.position();

        for _ in 0..120 {
            object.fixed_update(DT);
            let speed = object.velocity().norm();
            assert!(speed < previous_speed);

            // Semi-implicit Euler: displacement uses the updated velocity.
            let step = object.position() - previous_position;
            assert_relative_eq!(step, object.velocity() * DT, epsilon = 1e-6);

            previous_speed = speed;
            previous_position = object.position();
        }
    }

    #[test]
    fn test_movement_flag_tracks_drift() {
        let mut object = PhysicsObject::default()
            .with_friction(0.0)
            .with_velocity(Vec3::new(2.4, 0.0, 0.0));

        // 2.4 units/s at 60 Hz is 0.04 per step; movement is reported every third step.
        let reports: Vec<bool> = (0..6).map(|_| object.fixed_update(DT)).collect();
        assert_eq!(reports, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn test_set_position_transforms_collider() {
        let mut object = PhysicsObject::default().with_collider(Collider::sphere(0.25));
        object.set_position(Vec3::new(0.0, 5.0, 0.0));

        let bounds = object.bounds();
        assert_abs_diff_eq!(bounds.min.y, 4.75, epsilon = 1e-6);
        assert_abs_diff_eq!(bounds.max.y, 5.25, epsilon = 1e-6);
    }

    #[test]
    fn test_rigid_objects_ignore_forces() {
        let mut object = PhysicsObject::default()
            .with_rigid(true)
            .with_velocity(Vec3::new(0.0, 0.0, 6.0));
        object.apply_force(Vec3::new(0.0, -100.0, 0.0));
        object.fixed_update(DT);

        assert_relative_eq!(object.velocity(), Vec3::new(0.0, 0.0, 6.0));
        assert_relative_eq!(object.position(), Vec3::new(0.0, 0.0, 0.1), epsilon = 1e-6);
    }

    #[test]
    fn test_set_mass_validates() {
        let mut object = PhysicsObject::default();
        assert_eq!(object.set_mass(0.0), Err(PhysicsError::InvalidMass(0.0)));
        assert!(object.set_mass(-1.0).is_err());
        assert!(object.set_mass(f32::NAN).is_err());
        assert_eq!(object.mass(), 1.0);
        assert!(object.set_mass(4.0).is_ok());
        assert_eq!(object.mass(), 4.0);
    }
}
