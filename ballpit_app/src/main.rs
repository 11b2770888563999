//! Ball pit demo
//!
//! Drops a pile of balls onto the ground plane next to a rigid box and a
//! spring chain hanging from a rigid anchor, then logs a summary of the scene
//! once per simulated second.
//!
//! Usage: `ballpit [config.toml|config.ron]`

mod config;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use ballpit_engine::prelude::*;

use crate::config::BallPitConfig;

/// Simulated frame length fed to the fixed-timestep accumulator
const FRAME_TIME: f32 = 1.0 / 45.0;

#[derive(Error, Debug)]
enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Physics error: {0}")]
    Physics(#[from] PhysicsError),
}

/// Handles of everything the demo spawned
struct BallPit {
    balls: Vec<ObjectHandle>,
    chain: Vec<ObjectHandle>,
}

impl BallPit {
    fn populate(scene: &mut Scene, config: &BallPitConfig, rng: &mut impl Rng) -> Result<Self, AppError> {
        let area = config.spawn_area;
        let ground = config.scene.ground_plane.unwrap_or(0.0);

        let obstacle = scene.attach_object(
            PhysicsObject::new(Vec3::new(area.center().x, ground + 0.5, area.center().z))
                .with_collider(Collider::aabb(Vec3::new(1.0, 0.5, 1.0)))
                .with_rigid(true),
        )?;
        scene.set_object_render_info(obstacle, RenderInfo::new(Vec4::new(0.4, 0.4, 0.4, 1.0)));

        let mut balls = Vec::with_capacity(config.ball_count);
        for _ in 0..config.ball_count {
            let position = Vec3::new(
                rng.gen_range(area.min.x..area.max.x),
                rng.gen_range(area.min.y..area.max.y),
                rng.gen_range(area.min.z..area.max.z),
            );
            let ball = scene.attach_object(
                PhysicsObject::new(position)
                    .with_collider(Collider::sphere(config.ball_radius))
                    .with_bounciness(config.ball_bounciness),
            )?;
            let color = Vec4::new(rng.gen_range(0.2..1.0), rng.gen_range(0.2..1.0), rng.gen_range(0.2..1.0), 1.0);
            scene.set_object_render_info(ball, RenderInfo::new(color));
            balls.push(ball);
        }

        let chain = Self::spring_chain(scene, config)?;
        info!(
            "Spawned {} balls, a {}-link spring chain and a rigid obstacle",
            balls.len(),
            config.spring_chain_length
        );
        Ok(Self { balls, chain })
    }

    /// Chain of balls hanging from a rigid anchor beside the spawn area
    fn spring_chain(scene: &mut Scene, config: &BallPitConfig) -> Result<Vec<ObjectHandle>, AppError> {
        if config.spring_chain_length == 0 {
            return Ok(Vec::new());
        }

        let link = Spring::new(1.0, 60.0, 0.5);
        let top = Vec3::new(config.spawn_area.max.x + 2.0, config.spawn_area.max.y, 0.0);
        let anchor = scene.attach_object(PhysicsObject::new(top).with_rigid(true))?;

        let mut chain = vec![anchor];
        let mut previous = anchor;
        for index in 1..=config.spring_chain_length {
            let position = top - Vec3::new(0.0, link.rest_length * index as f32, 0.0);
            let ball = scene.attach_object(
                PhysicsObject::new(position).with_collider(Collider::sphere(config.ball_radius)),
            )?;
            let spring = scene.attach_constraint(Constraint::spring(previous, ball, link))?;
            scene.set_constraint_render_info(spring, RenderInfo::new(Vec4::new(0.9, 0.9, 0.2, 1.0)));
            chain.push(ball);
            previous = ball;
        }
        Ok(chain)
    }

    fn log_summary(&self, scene: &Scene) {
        let heights = self
            .balls
            .iter()
            .filter_map(|&handle| scene.object(handle))
            .map(|ball| ball.position().y);
        let (lowest, highest) = heights.fold((f32::INFINITY, f32::NEG_INFINITY), |(low, high), y| {
            (low.min(y), high.max(y))
        });
        let chain_end = self
            .chain
            .last()
            .and_then(|&handle| scene.object(handle))
            .map(PhysicsObject::position);

        info!(
            "t={:.1}s objects={} collisions={} lowest={:.3} highest={:.3} chain_end={:?}",
            scene.step_count() as f32 * scene.fixed_timestep(),
            scene.object_count(),
            scene.last_collisions().len(),
            lowest,
            highest,
            chain_end
        );
        if let Some(octree) = scene.octree() {
            debug!("Octree: {} nodes, depth {}", octree.node_count(), octree.depth());
        }
    }
}

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {path}");
            BallPitConfig::load_from_file(&path)?
        }
        None => BallPitConfig::default(),
    };
    config.validate().map_err(AppError::InvalidConfig)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut scene = Scene::new(config.scene.clone())?;
    let pit = BallPit::populate(&mut scene, &config, &mut rng)?;

    let steps_per_second = (1.0 / scene.fixed_timestep()).round().max(1.0) as u64;
    let mut next_summary = steps_per_second;
    while scene.step_count() < u64::from(config.steps) {
        scene.advance(FRAME_TIME)?;
        if scene.step_count() >= next_summary {
            pit.log_summary(&scene);
            next_summary += steps_per_second;
        }
    }

    pit.log_summary(&scene);
    info!("Simulated {} steps with the {} broad phase", scene.step_count(), scene.broad_phase().name());
    Ok(())
}
