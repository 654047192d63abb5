//! Game loop simulation: every frame creates an entity, gives it components, queues it for
//! destruction and ticks the world, so ids are recycled continuously.
//!
//! Run with `RUST_LOG=debug cargo run --example simple_world` to see registrations.

use std::time::Instant;

use log::info;
use sieve_engine::ecs::{CapacityError, System, World, system::Frame};
use sieve_macros::Component;

const FRAMES: u32 = 1000;

#[derive(Component, Default)]
struct Score(u32);

#[derive(Component, Default)]
struct Bonus(u32);

#[derive(Default)]
struct ScoreSystem;

impl System for ScoreSystem {
    type Filter = (Score,);

    fn update(&mut self, mut frame: Frame<'_>) {
        if let Some(mut scores) = frame.values_mut::<Score>() {
            for score in scores.components_mut() {
                score.0 += 10;
            }
        }
    }
}

#[derive(Default)]
struct BonusSystem;

impl System for BonusSystem {
    type Filter = (Bonus,);

    fn update(&mut self, mut frame: Frame<'_>) {
        for &entity in frame.entities() {
            if let Some(bonus) = frame.get_mut::<Bonus>(entity) {
                bonus.0 += 5;
            }
        }
    }
}

fn main() -> Result<(), CapacityError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut world = World::new();
    world.add_system::<ScoreSystem>()?;
    world.add_system::<BonusSystem>()?;

    let start = Instant::now();
    for frame in 0..FRAMES {
        let entity = world.create_entity();
        world.add_component(entity, Score::default())?;
        if frame % 2 == 0 {
            world.add_component(entity, Bonus::default())?;
        }
        world.destroy_entity(entity);

        world.tick(1.0 / 60.0);
    }
    let elapsed = start.elapsed();

    info!(
        "Time taken: {:.3}ms | {:.4}ms per frame | {} live entities after {} ticks",
        elapsed.as_secs_f64() * 1000.0,
        elapsed.as_secs_f64() * 1000.0 / f64::from(FRAMES),
        world.entity_count(),
        world.ticks()
    );
    Ok(())
}
