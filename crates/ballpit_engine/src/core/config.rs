//! # Scene Configuration
//!
//! Tunables for a physics scene. Every field has a default, so a config file
//! only needs to name what it changes:
//!
//! ```toml
//! gravity = [0.0, -9.8, 0.0]
//! ground_plane = 0.5
//! broad_phase = "Octree"
//!
//! [octree]
//! min_node_size = 2.0
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError, ConfigFormat};
use crate::foundation::math::Vec3;
use crate::foundation::time::DEFAULT_FIXED_TIMESTEP;
use crate::spatial::{BroadPhase, BruteForce, Octree, OctreeConfig};

/// Broad-phase scheme used by a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BroadPhaseKind {
    /// Octree partition
    #[default]
    Octree,
    /// Test every pair
    BruteForce,
}

impl BroadPhaseKind {
    /// Instantiate the scheme
    pub fn build(self, octree: &OctreeConfig) -> Box<dyn BroadPhase> {
        match self {
            Self::Octree => Box::new(Octree::new(octree.clone())),
            Self::BruteForce => Box::new(BruteForce::new()),
        }
    }
}

/// # Scene Configuration
///
/// Scene-wide forces, timestep and broad-phase selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Acceleration applied to every dynamic object
    pub gravity: Vec3,
    /// Length of one simulation step in seconds
    pub fixed_timestep: f32,
    /// Cap on steps run by a single `advance` call
    pub max_steps_per_advance: u32,
    /// Floor height; `None` disables the ground clamp
    pub ground_plane: Option<f32>,
    /// Broad-phase scheme
    pub broad_phase: BroadPhaseKind,
    /// Octree tuning, ignored by other schemes
    pub octree: OctreeConfig,
}

impl SceneConfig {
    /// Create a scene configuration with defaults
    pub fn new() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            fixed_timestep: DEFAULT_FIXED_TIMESTEP,
            max_steps_per_advance: 8,
            ground_plane: None,
            broad_phase: BroadPhaseKind::default(),
            octree: OctreeConfig::default(),
        }
    }

    /// Set gravity
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the step length
    pub fn with_fixed_timestep(mut self, step: f32) -> Self {
        self.fixed_timestep = step;
        self
    }

    /// Enable the ground clamp at `height`
    pub fn with_ground_plane(mut self, height: f32) -> Self {
        self.ground_plane = Some(height);
        self
    }

    /// Select the broad phase
    pub fn with_broad_phase(mut self, kind: BroadPhaseKind) -> Self {
        self.broad_phase = kind;
        self
    }

    /// Replace the octree tuning
    pub fn with_octree(mut self, octree: OctreeConfig) -> Self {
        self.octree = octree;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(format!("fixed_timestep must be positive, got {}", self.fixed_timestep));
        }
        if self.max_steps_per_advance == 0 {
            return Err("max_steps_per_advance must be at least 1".to_string());
        }
        if !self.gravity.iter().all(|component| component.is_finite()) {
            return Err("gravity must be finite".to_string());
        }
        if self.octree.min_node_size.is_nan() || self.octree.min_node_size <= 0.0 {
            return Err(format!("octree.min_node_size must be positive, got {}", self.octree.min_node_size));
        }
        Ok(())
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for SceneConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::AABB;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_relative_eq!(config.gravity, Vec3::new(0.0, -9.8, 0.0));
        assert_relative_eq!(config.fixed_timestep, 1.0 / 60.0);
        assert_eq!(config.ground_plane, None);
        assert_eq!(config.broad_phase, BroadPhaseKind::Octree);
        assert_eq!(config.octree.initial_lifespan, 8);
        assert_eq!(config.octree.max_lifespan, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            ground_plane = 0.5
            broad_phase = "BruteForce"

            [octree]
            min_node_size = 2.0
        "#;
        let config = SceneConfig::from_str_as(text, ConfigFormat::Toml).unwrap();

        assert_eq!(config.ground_plane, Some(0.5));
        assert_eq!(config.broad_phase, BroadPhaseKind::BruteForce);
        assert_relative_eq!(config.octree.min_node_size, 2.0);
        assert_eq!(config.octree.max_lifespan, 64);
        assert_relative_eq!(config.gravity, Vec3::new(0.0, -9.8, 0.0));
    }

    #[test]
    fn test_ron_round_trip_with_region() {
        let config = SceneConfig::new()
            .with_gravity(Vec3::new(0.0, -1.0, 0.0))
            .with_ground_plane(0.0)
            .with_octree(OctreeConfig {
                region: Some(AABB::new(Vec3::repeat(-16.0), Vec3::repeat(16.0))),
                ..OctreeConfig::default()
            });

        let text = config.to_string_as(ConfigFormat::Ron).unwrap();
        let parsed = SceneConfig::from_str_as(&text, ConfigFormat::Ron).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_bad_timestep() {
        assert!(SceneConfig::new().with_fixed_timestep(0.0).validate().is_err());
        assert!(SceneConfig::new().with_fixed_timestep(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_build_broad_phase() {
        let octree = OctreeConfig::default();
        assert_eq!(BroadPhaseKind::Octree.build(&octree).name(), "octree");
        assert_eq!(BroadPhaseKind::BruteForce.build(&octree).name(), "brute-force");
    }
}
