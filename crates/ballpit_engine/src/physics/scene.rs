//! Physics scene
//!
//! The scene owns every object and constraint and drives the fixed-timestep
//! update. One step runs, in order:
//!
//! 1. every constraint applies its forces;
//! 2. the broad phase integrates all objects (gravity, global force, ground
//!    clamp), detects overlapping pairs and resolves them;
//! 3. the per-step global force is cleared.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::config::SceneConfig;
use crate::foundation::collections::{ConstraintHandle, ObjectHandle, SecondaryMap, SlotMap};
use crate::foundation::math::{Vec3, Vec4};
use crate::foundation::time::FixedTimestep;
use crate::spatial::{BroadPhase, Octree};
use super::constraint::Constraint;
use super::error::{PhysicsError, PhysicsResult};
use super::object::{validate_mass, PhysicsObject};
use super::resolution::CollisionInfo;
use super::step::{ObjectSet, StepEnvironment};

/// Render metadata attached to an object or constraint
///
/// Stored for the renderer only; the simulation never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderInfo {
    /// RGBA colour
    pub color: Vec4,
}

impl RenderInfo {
    /// Render info with the given colour
    pub fn new(color: Vec4) -> Self {
        Self { color }
    }
}

impl Default for RenderInfo {
    fn default() -> Self {
        Self::new(Vec4::new(1.0, 1.0, 1.0, 1.0))
    }
}

/// Owner of all simulated objects and constraints
pub struct Scene {
    config: SceneConfig,
    objects: ObjectSet,
    constraints: SlotMap<ConstraintHandle, Constraint>,
    broad_phase: Box<dyn BroadPhase>,
    gravity: Vec3,
    global_force: Vec3,
    timestep: FixedTimestep,
    step_count: u64,
    object_render_info: SecondaryMap<ObjectHandle, RenderInfo>,
    constraint_render_info: SecondaryMap<ConstraintHandle, RenderInfo>,
}

impl Default for Scene {
    fn default() -> Self {
        let config = SceneConfig::default();
        let broad_phase = config.broad_phase.build(&config.octree);
        Self::assemble(config, broad_phase)
    }
}

impl Scene {
    /// Create an empty scene using the configured broad phase
    ///
    /// Fails with [`PhysicsError::InvalidConfig`] if the configuration does not validate.
    pub fn new(config: SceneConfig) -> PhysicsResult<Self> {
        let broad_phase = config.broad_phase.build(&config.octree);
        Self::with_broad_phase(config, broad_phase)
    }

    /// Create an empty scene with an explicit broad phase
    pub fn with_broad_phase(config: SceneConfig, broad_phase: Box<dyn BroadPhase>) -> PhysicsResult<Self> {
        config.validate().map_err(PhysicsError::InvalidConfig)?;
        Ok(Self::assemble(config, broad_phase))
    }

    fn assemble(config: SceneConfig, broad_phase: Box<dyn BroadPhase>) -> Self {
        debug!("Creating scene with {} broad phase", broad_phase.name());
        Self {
            gravity: config.gravity,
            global_force: Vec3::zeros(),
            timestep: FixedTimestep::new(config.fixed_timestep, config.max_steps_per_advance),
            step_count: 0,
            objects: ObjectSet::with_key(),
            constraints: SlotMap::with_key(),
            broad_phase,
            object_render_info: SecondaryMap::new(),
            constraint_render_info: SecondaryMap::new(),
            config,
        }
    }

    /// Configuration the scene was created with
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Take ownership of an object
    ///
    /// Fails with [`PhysicsError::InvalidMass`](super::error::PhysicsError::InvalidMass)
    /// if its mass is not finite and positive.
    pub fn attach_object(&mut self, object: PhysicsObject) -> PhysicsResult<ObjectHandle> {
        validate_mass(object.mass())?;
        let handle = self.objects.insert(object);
        self.broad_phase.insert(handle);
        debug!("Attached object {:?}", handle);
        Ok(handle)
    }

    /// Remove an object, its render info and every constraint attached to it
    ///
    /// Removing an unknown or already removed object is a no-op.
    pub fn remove_object(&mut self, handle: ObjectHandle) -> Option<PhysicsObject> {
        let object = self.objects.remove(handle)?;
        self.broad_phase.remove(handle);
        self.object_render_info.remove(handle);

        let attached: Vec<ConstraintHandle> = self
            .constraints
            .iter()
            .filter(|(_, constraint)| constraint.connects(handle))
            .map(|(constraint_handle, _)| constraint_handle)
            .collect();
        for constraint_handle in attached {
            self.remove_constraint(constraint_handle);
        }

        debug!("Removed object {:?}", handle);
        Some(object)
    }

    /// Take ownership of a constraint after checking it can be simulated
    pub fn attach_constraint(&mut self, constraint: Constraint) -> PhysicsResult<ConstraintHandle> {
        constraint.validate(&self.objects)?;
        let handle = self.constraints.insert(constraint);
        debug!("Attached {:?} constraint {:?}", constraint.constraint_type(), handle);
        Ok(handle)
    }

    /// Remove a constraint; unknown handles are a no-op
    pub fn remove_constraint(&mut self, handle: ConstraintHandle) -> Option<Constraint> {
        let constraint = self.constraints.remove(handle)?;
        self.constraint_render_info.remove(handle);
        debug!("Removed constraint {:?}", handle);
        Some(constraint)
    }

    /// Set gravity
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Current gravity
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Add a force applied to every dynamic object during the next step only
    pub fn apply_global_force(&mut self, force: Vec3) {
        self.global_force += force;
    }

    /// Global force accumulated for the next step
    pub fn global_force(&self) -> Vec3 {
        self.global_force
    }

    /// Every object with its handle
    pub fn objects(&self) -> impl Iterator<Item = (ObjectHandle, &PhysicsObject)> {
        self.objects.iter()
    }

    /// Number of objects
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Look up an object
    pub fn object(&self, handle: ObjectHandle) -> Option<&PhysicsObject> {
        self.objects.get(handle)
    }

    /// Look up an object for mutation
    pub fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut PhysicsObject> {
        self.objects.get_mut(handle)
    }

    /// Every constraint with its handle
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintHandle, &Constraint)> {
        self.constraints.iter()
    }

    /// Number of constraints
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Look up a constraint
    pub fn constraint(&self, handle: ConstraintHandle) -> Option<&Constraint> {
        self.constraints.get(handle)
    }

    /// Look up a constraint for mutation
    pub fn constraint_mut(&mut self, handle: ConstraintHandle) -> Option<&mut Constraint> {
        self.constraints.get_mut(handle)
    }

    /// Pairs detected during the most recent step
    pub fn last_collisions(&self) -> &[CollisionInfo] {
        self.broad_phase.collisions()
    }

    /// Active broad phase
    pub fn broad_phase(&self) -> &dyn BroadPhase {
        self.broad_phase.as_ref()
    }

    /// The octree, when it is the active broad phase
    pub fn octree(&self) -> Option<&Octree> {
        self.broad_phase.as_any().downcast_ref::<Octree>()
    }

    /// Attach render info to an object; returns `false` for unknown handles
    pub fn set_object_render_info(&mut self, handle: ObjectHandle, info: RenderInfo) -> bool {
        if !self.objects.contains_key(handle) {
            return false;
        }
        self.object_render_info.insert(handle, info);
        true
    }

    /// Render info of an object, the default for objects that never set any
    pub fn object_render_info(&self, handle: ObjectHandle) -> Option<RenderInfo> {
        self.objects
            .contains_key(handle)
            .then(|| self.object_render_info.get(handle).copied().unwrap_or_default())
    }

    /// Attach render info to a constraint; returns `false` for unknown handles
    pub fn set_constraint_render_info(&mut self, handle: ConstraintHandle, info: RenderInfo) -> bool {
        if !self.constraints.contains_key(handle) {
            return false;
        }
        self.constraint_render_info.insert(handle, info);
        true
    }

    /// Render info of a constraint, the default for constraints that never set any
    pub fn constraint_render_info(&self, handle: ConstraintHandle) -> Option<RenderInfo> {
        self.constraints
            .contains_key(handle)
            .then(|| self.constraint_render_info.get(handle).copied().unwrap_or_default())
    }

    /// Steps run since creation
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Length of one step in seconds
    pub fn fixed_timestep(&self) -> f32 {
        self.timestep.step()
    }

    /// Run one simulation step
    pub fn fixed_update(&mut self) -> PhysicsResult<()> {
        for constraint in self.constraints.values() {
            constraint.fixed_update(&mut self.objects)?;
        }

        let env = StepEnvironment {
            dt: self.timestep.step(),
            gravity: self.gravity,
            global_force: self.global_force,
            ground_plane: self.config.ground_plane,
        };
        self.broad_phase.update(&mut self.objects, &env);

        self.global_force = Vec3::zeros();
        self.step_count += 1;
        Ok(())
    }

    /// Run as many whole steps as `elapsed` seconds cover
    ///
    /// Leftover time carries over to the next call. At most
    /// `max_steps_per_advance` steps run per call; any further backlog is
    /// dropped. Returns the number of steps run.
    pub fn advance(&mut self, elapsed: f32) -> PhysicsResult<u32> {
        let steps = self.timestep.accumulate(elapsed);
        for _ in 0..steps {
            self.fixed_update()?;
        }
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::Collider;
    use crate::physics::constraint::{ConstraintType, Spring};
    use crate::spatial::OctreeConfig;
    use approx::assert_relative_eq;

    #[test]
    fn test_attach_rejects_invalid_mass() {
        let mut scene = Scene::default();
        let result = scene.attach_object(PhysicsObject::default().with_mass(0.0));
        assert_eq!(result, Err(PhysicsError::InvalidMass(0.0)));
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn test_attach_constraint_validation() {
        let mut scene = Scene::default();
        let a = scene.attach_object(PhysicsObject::default()).unwrap();
        let b = scene.attach_object(PhysicsObject::new(Vec3::x())).unwrap();

        assert_eq!(
            scene.attach_constraint(Constraint::joint(a, b)),
            Err(PhysicsError::UnsupportedConstraint(ConstraintType::Joint))
        );
        assert!(scene.attach_constraint(Constraint::spring(a, b, Spring::default())).is_ok());
        assert_eq!(scene.constraint_count(), 1);
    }

    #[test]
    fn test_removing_object_detaches_its_constraints() {
        let mut scene = Scene::default();
        let a = scene.attach_object(PhysicsObject::default()).unwrap();
        let b = scene.attach_object(PhysicsObject::new(Vec3::x())).unwrap();
        let c = scene.attach_object(PhysicsObject::new(Vec3::y())).unwrap();
        let ab = scene.attach_constraint(Constraint::spring(a, b, Spring::default())).unwrap();
        let bc = scene.attach_constraint(Constraint::spring(b, c, Spring::default())).unwrap();

        assert!(scene.remove_object(a).is_some());
        assert!(scene.constraint(ab).is_none());
        assert!(scene.constraint(bc).is_some());
        assert!(scene.fixed_update().is_ok());
    }

    #[test]
    fn test_render_info_defaults_and_lifetime() {
        let mut scene = Scene::default();
        let a = scene.attach_object(PhysicsObject::default()).unwrap();
        assert_eq!(scene.object_render_info(a), Some(RenderInfo::default()));

        let red = RenderInfo::new(Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert!(scene.set_object_render_info(a, red));
        assert_eq!(scene.object_render_info(a), Some(red));

        scene.remove_object(a);
        assert_eq!(scene.object_render_info(a), None);
        assert!(!scene.set_object_render_info(a, red));
    }

    #[test]
    fn test_global_force_lasts_one_step() {
        let config = SceneConfig::new().with_gravity(Vec3::zeros());
        let mut scene = Scene::new(config).unwrap();
        let a = scene
            .attach_object(PhysicsObject::default().with_friction(0.0).with_collider(Collider::sphere(0.5)))
            .unwrap();

        scene.apply_global_force(Vec3::new(60.0, 0.0, 0.0));
        scene.apply_global_force(Vec3::new(60.0, 0.0, 0.0));
        assert_relative_eq!(scene.global_force(), Vec3::new(120.0, 0.0, 0.0));
        scene.fixed_update().unwrap();
        assert_relative_eq!(scene.global_force(), Vec3::zeros());
        let after_push = scene.object(a).unwrap().velocity();
        assert_relative_eq!(after_push, Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);

        scene.fixed_update().unwrap();
        assert_relative_eq!(scene.object(a).unwrap().velocity(), after_push, epsilon = 1e-6);
    }

    #[test]
    fn test_advance_runs_whole_steps() {
        let mut scene = Scene::default();
        assert_eq!(scene.advance(0.01).unwrap(), 0);
        assert_eq!(scene.advance(0.01).unwrap(), 1);
        assert_eq!(scene.advance(10.0).unwrap(), 8);
        assert_eq!(scene.step_count(), 9);
    }

    #[test]
    fn test_octree_downcast() {
        assert!(Scene::default().octree().is_some());
        let brute = Scene::new(SceneConfig::new().with_broad_phase(crate::core::BroadPhaseKind::BruteForce)).unwrap();
        assert!(brute.octree().is_none());
        assert_eq!(brute.broad_phase().name(), "brute-force");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let bad_step = SceneConfig::new().with_fixed_timestep(0.0);
        assert!(matches!(Scene::new(bad_step), Err(PhysicsError::InvalidConfig(_))));

        for min_node_size in [0.0, -1.0] {
            let config = SceneConfig::new().with_octree(OctreeConfig { min_node_size, ..OctreeConfig::default() });
            assert!(matches!(Scene::new(config), Err(PhysicsError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_removing_foreign_handle_is_noop() {
        let mut other = Scene::default();
        let foreign = other.attach_object(PhysicsObject::default()).unwrap();

        let mut scene = Scene::default();
        assert!(scene.remove_object(foreign).is_none());
        assert_eq!(scene.object_count(), 0);
        assert!(scene.fixed_update().is_ok());
        assert_eq!(other.object_count(), 1);
    }
}
