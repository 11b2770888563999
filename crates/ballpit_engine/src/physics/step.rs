//! Per-step integration environment shared by every broad phase

use crate::foundation::collections::{ObjectHandle, SlotMap};
use crate::foundation::math::Vec3;
use super::object::PhysicsObject;

/// Storage for every object owned by a scene
pub type ObjectSet = SlotMap<ObjectHandle, PhysicsObject>;

/// Scene-wide inputs to one integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEnvironment {
    /// Step length in seconds
    pub dt: f32,
    /// Acceleration applied to every dynamic object
    pub gravity: Vec3,
    /// Force accumulated on the scene for this step only
    pub global_force: Vec3,
    /// Optional floor height; dynamic objects never end a step below it
    pub ground_plane: Option<f32>,
}

impl StepEnvironment {
    /// Apply gravity and the global force, integrate, then clamp to the ground
    ///
    /// Returns the object's movement signal.
    pub fn integrate(&self, object: &mut PhysicsObject) -> bool {
        if !object.is_rigid() {
            object.add_acceleration(self.gravity);
            object.apply_force(self.global_force);
        }

        let mut moved = object.fixed_update(self.dt);

        if let Some(ground) = self.ground_plane {
            let position = object.position();
            if !object.is_rigid() && position.y < ground {
                let velocity = object.velocity();
                object.set_position(Vec3::new(position.x, ground, position.z));
                object.set_velocity(Vec3::new(velocity.x, -velocity.y, velocity.z));
                moved = true;
            }
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn environment() -> StepEnvironment {
        StepEnvironment {
            dt: 0.1,
            gravity: Vec3::new(0.0, -10.0, 0.0),
            global_force: Vec3::zeros(),
            ground_plane: None,
        }
    }

    #[test]
    fn test_gravity_is_mass_independent() {
        let env = environment();
        let mut light = PhysicsObject::default().with_friction(0.0);
        let mut heavy = PhysicsObject::default().with_friction(0.0).with_mass(10.0);
        env.integrate(&mut light);
        env.integrate(&mut heavy);

        assert_relative_eq!(light.velocity(), Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(heavy.velocity(), light.velocity(), epsilon = 1e-6);
    }

    #[test]
    fn test_global_force_scales_with_mass() {
        let env = StepEnvironment {
            gravity: Vec3::zeros(),
            global_force: Vec3::new(4.0, 0.0, 0.0),
            ..environment()
        };
        let mut object = PhysicsObject::default().with_friction(0.0).with_mass(2.0);
        env.integrate(&mut object);
        assert_relative_eq!(object.velocity(), Vec3::new(0.2, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_ground_plane_reflects_vertical_velocity() {
        let env = StepEnvironment {
            ground_plane: Some(0.5),
            ..environment()
        };
        let mut object = PhysicsObject::new(Vec3::new(1.0, 0.55, 0.0))
            .with_friction(0.0)
            .with_velocity(Vec3::new(1.0, -2.0, 0.0));

        assert!(env.integrate(&mut object));
        assert_abs_diff_eq!(object.position().y, 0.5);
        assert!(object.velocity().y > 0.0);
        assert_abs_diff_eq!(object.velocity().x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rigid_objects_skip_environment() {
        let env = StepEnvironment {
            ground_plane: Some(0.0),
            global_force: Vec3::new(100.0, 0.0, 0.0),
            ..environment()
        };
        let mut object = PhysicsObject::new(Vec3::new(0.0, -3.0, 0.0)).with_rigid(true);
        env.integrate(&mut object);

        assert_relative_eq!(object.position(), Vec3::new(0.0, -3.0, 0.0));
        assert_relative_eq!(object.velocity(), Vec3::zeros());
    }
}
