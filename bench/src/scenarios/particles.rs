//! Particle system benchmark scenario.
//!
//! Simulates a high-volume particle system with:
//! - 100,000 particles
//! - Components: Position, Velocity, Lifetime, Color
//! - Systems: movement, lifetime decay, fade, and a reaper that destroys expired particles and
//!   queues a replacement for each
//!
//! This scenario tests:
//! - Iteration over large matched sets
//! - Value access through component stores
//! - Destroy and create throughput, and with it id recycling and store shrink/grow

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sieve_engine::ecs::{CapacityError, Entity, System, World, system::Frame};

use crate::{
    components::{Color, Lifetime, Position, Velocity},
    scenarios::Scenario,
};

/// Configuration for the particle benchmark.
#[derive(Debug, Clone)]
pub struct ParticleConfig {
    /// Total number of particles to maintain.
    pub particle_count: usize,
    /// Simulated delta time per frame.
    pub delta_time: f32,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            particle_count: 100_000,
            delta_time: 1.0 / 60.0, // 60 FPS
            seed: 12345,
        }
    }
}

/// The components of one particle.
#[derive(Debug, Clone, Copy)]
struct Particle {
    position: Position,
    velocity: Velocity,
    lifetime: Lifetime,
    color: Color,
}

impl Particle {
    fn random(rng: &mut ChaCha8Rng) -> Self {
        Self {
            position: Position {
                x: rng.gen_range(-100.0..100.0),
                y: rng.gen_range(-100.0..100.0),
                z: rng.gen_range(-100.0..100.0),
            },
            velocity: Velocity {
                x: rng.gen_range(-10.0..10.0),
                y: rng.gen_range(-10.0..10.0),
                z: rng.gen_range(-10.0..10.0),
            },
            lifetime: Lifetime {
                remaining: rng.gen_range(1.0..5.0),
                total: 5.0,
            },
            color: Color {
                r: rng.gen_range(0.0..1.0),
                g: rng.gen_range(0.0..1.0),
                b: rng.gen_range(0.0..1.0),
                a: 1.0,
            },
        }
    }

    fn attach(self, world: &mut World, entity: Entity) -> Result<(), CapacityError> {
        world.add_component(entity, self.position)?;
        world.add_component(entity, self.velocity)?;
        world.add_component(entity, self.lifetime)?;
        world.add_component(entity, self.color)?;
        Ok(())
    }
}

/// Update particle positions based on velocity.
#[derive(Default)]
struct Movement;

impl System for Movement {
    type Filter = (Position, Velocity);

    fn update(&mut self, mut frame: Frame<'_>) {
        let dt = frame.delta();
        for &entity in frame.entities() {
            let Some(&vel) = frame.get::<Velocity>(entity) else {
                continue;
            };
            if let Some(pos) = frame.get_mut::<Position>(entity) {
                pos.x += vel.x * dt;
                pos.y += vel.y * dt;
                pos.z += vel.z * dt;
            }
        }
    }
}

/// Decay particle lifetimes.
#[derive(Default)]
struct LifetimeDecay;

impl System for LifetimeDecay {
    type Filter = (Lifetime,);

    fn update(&mut self, mut frame: Frame<'_>) {
        let dt = frame.delta();
        if let Some(mut lifetimes) = frame.values_mut::<Lifetime>() {
            for lifetime in lifetimes.components_mut() {
                lifetime.remaining -= dt;
            }
        }
    }
}

/// Fade particles based on remaining lifetime.
#[derive(Default)]
struct Fade;

impl System for Fade {
    type Filter = (Lifetime, Color);

    fn update(&mut self, mut frame: Frame<'_>) {
        for &entity in frame.entities() {
            let Some(&lifetime) = frame.get::<Lifetime>(entity) else {
                continue;
            };
            if let Some(color) = frame.get_mut::<Color>(entity) {
                color.a = (lifetime.remaining / lifetime.total).max(0.0);
            }
        }
    }
}

/// Destroy expired particles and queue a fresh one for each.
struct Reaper {
    rng: ChaCha8Rng,
}

impl System for Reaper {
    type Filter = (Lifetime,);

    fn update(&mut self, frame: Frame<'_>) {
        let commands = frame.commands();
        for &entity in frame.entities() {
            let expired = frame
                .get::<Lifetime>(entity)
                .is_some_and(|life| life.remaining <= 0.0);
            if expired {
                commands.destroy(entity);
                let particle = Particle::random(&mut self.rng);
                commands.create(move |world, entity| particle.attach(world, entity));
            }
        }
    }
}

/// Particle system benchmark scenario.
pub struct ParticleScenario {
    config: ParticleConfig,
    world: World,
}

impl ParticleScenario {
    /// Create a new particle scenario with default config.
    pub fn new() -> Self {
        Self::with_config(ParticleConfig::default())
    }

    /// Create a new particle scenario with custom config.
    pub fn with_config(config: ParticleConfig) -> Self {
        Self {
            world: World::new(),
            config,
        }
    }

    /// Get current particle count.
    pub fn current_count(&self) -> usize {
        self.world.entity_count()
    }

    pub fn world(&self) -> &World {
        &self.world
    }
}

impl Default for ParticleScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario for ParticleScenario {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn description(&self) -> &'static str {
        "High-volume particle system with movement, lifetime, and respawn"
    }

    fn entity_count(&self) -> usize {
        self.config.particle_count
    }

    fn setup(&mut self) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        for _ in 0..self.config.particle_count {
            let entity = self.world.create_entity();
            Particle::random(&mut rng)
                .attach(&mut self.world, entity)
                .expect("particle components fit the type registry");
        }

        self.world.add_system::<Movement>().expect("register movement");
        self.world.add_system::<Fade>().expect("register fade");
        self.world
            .add_system::<LifetimeDecay>()
            .expect("register lifetime decay");
        self.world
            .add_system_with(|| Reaper { rng })
            .expect("register reaper");
    }

    fn update(&mut self) {
        self.world.tick(self.config.delta_time);
    }

    fn teardown(&mut self) {
        let entities = self.world.entities().collect::<Vec<_>>();
        for entity in entities {
            self.world.destroy_now(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_scenario_setup() {
        let mut scenario = ParticleScenario::with_config(ParticleConfig {
            particle_count: 100,
            ..Default::default()
        });

        scenario.setup();
        assert_eq!(scenario.current_count(), 100);
        assert_eq!(scenario.world().matched::<Movement>().map(|m| m.len()), Some(100));

        scenario.teardown();
        assert_eq!(scenario.current_count(), 0);
    }

    #[test]
    fn particle_scenario_keeps_population() {
        let mut scenario = ParticleScenario::with_config(ParticleConfig {
            particle_count: 100,
            delta_time: 0.5,
            ..Default::default()
        });

        scenario.setup();

        // Lifetimes are at most 5s, so every particle expires and respawns within 12 frames.
        for _ in 0..12 {
            scenario.update();
        }

        assert_eq!(scenario.current_count(), 100);
        assert_eq!(scenario.world().matched::<Fade>().map(|m| m.len()), Some(100));

        scenario.teardown();
    }
}
