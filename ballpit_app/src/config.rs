//! Demo configuration

use serde::{Deserialize, Serialize};

use ballpit_engine::core::config::{Config, SceneConfig};
use ballpit_engine::foundation::math::Vec3;
use ballpit_engine::physics::AABB;

/// Ball pit demo settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallPitConfig {
    /// Physics scene settings
    pub scene: SceneConfig,
    /// Number of free balls to drop
    pub ball_count: usize,
    /// Box the balls spawn in
    pub spawn_area: AABB,
    /// Ball radius
    pub ball_radius: f32,
    /// Ball restitution
    pub ball_bounciness: f32,
    /// Number of balls in the hanging spring chain, 0 to disable
    pub spring_chain_length: usize,
    /// Steps to simulate before exiting
    pub steps: u32,
    /// Seed for spawn positions; random when unset
    pub seed: Option<u64>,
}

impl BallPitConfig {
    /// Create a demo configuration with defaults
    pub fn new() -> Self {
        Self {
            scene: SceneConfig::new().with_ground_plane(0.5),
            ball_count: 200,
            spawn_area: AABB::new(Vec3::new(-4.0, 2.0, -4.0), Vec3::new(4.0, 12.0, 4.0)),
            ball_radius: 0.25,
            ball_bounciness: 0.5,
            spring_chain_length: 4,
            steps: 600,
            seed: None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.scene.validate()?;
        if !(self.ball_radius.is_finite() && self.ball_radius > 0.0) {
            return Err(format!("ball_radius must be positive, got {}", self.ball_radius));
        }
        if self.spawn_area.is_degenerate() {
            return Err("spawn_area must have a positive size on every axis".to_string());
        }
        Ok(())
    }
}

impl Default for BallPitConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for BallPitConfig {}
