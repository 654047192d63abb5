//! Systems: per-tick logic over the entities matching a component filter.
//!
//! # Overview
//!
//! A system declares the component types it needs through its [`System::Filter`]. The world keeps
//! the set of entities carrying all of them up to date incrementally as components come and go,
//! and on every tick hands that set to [`System::update`] inside a [`Frame`].
//!
//! ```rust,ignore
//! use sieve_engine::ecs::{Component, System, system::Frame};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! #[derive(Component)]
//! struct Velocity { dx: f32, dy: f32 }
//!
//! #[derive(Default)]
//! struct Movement;
//!
//! impl System for Movement {
//!     type Filter = (Position, Velocity);
//!
//!     fn update(&mut self, mut frame: Frame<'_>) {
//!         let delta = frame.delta();
//!         for &entity in frame.entities() {
//!             let Some(&Velocity { dx, dy }) = frame.get::<Velocity>(entity) else { continue };
//!             if let Some(position) = frame.get_mut::<Position>(entity) {
//!                 position.x += dx * delta;
//!                 position.y += dy * delta;
//!             }
//!         }
//!     }
//! }
//!
//! world.add_system::<Movement>()?;
//! world.tick(1.0 / 60.0);
//! ```
//!
//! # Structural changes
//!
//! A [`Frame`] gives value access to component stores only. Entity creation and destruction and
//! component addition and removal go through [`Frame::commands`] and are applied after every
//! system of the tick has run, so no system observes the matched set of another changing under it.

mod command;
mod matched;
mod registry;

pub use command::{Command, CommandBuffer, Commands};
pub use matched::Matched;
pub use registry::Registry;

use crate::ecs::{
    component::{Component, ComponentStore, Components, ValuesMut},
    entity::Entity,
    filter::Accept,
};

/// Logic run once per tick over the entities matching `Filter`.
pub trait System: 'static {
    /// The component types an entity must carry to be matched. `()` matches nothing.
    type Filter: Accept;

    /// Process the matched entities for one tick.
    fn update(&mut self, frame: Frame<'_>);
}

/// Everything a system sees during one update.
pub struct Frame<'a> {
    entities: &'a Matched,
    components: &'a mut Components,
    commands: Commands<'a>,
    delta: f32,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(
        entities: &'a Matched,
        components: &'a mut Components,
        commands: &'a CommandBuffer,
        delta: f32,
    ) -> Self {
        Self {
            entities,
            components,
            commands: Commands::new(commands),
            delta,
        }
    }

    /// The entities currently matching the system's filter.
    #[inline]
    pub fn entities(&self) -> &'a Matched {
        self.entities
    }

    /// Time elapsed since the previous tick, as passed to `World::tick`.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    #[inline]
    pub fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.components.get(entity)
    }

    #[inline]
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.components.get_mut(entity)
    }

    /// Read access to every `C` in the world.
    #[inline]
    pub fn store<C: Component>(&self) -> Option<&ComponentStore<C>> {
        self.components.store()
    }

    /// Write access to the values of every `C` in the world.
    #[inline]
    pub fn values_mut<C: Component>(&mut self) -> Option<ValuesMut<'_, C>> {
        self.components.values_mut()
    }

    /// Queue structural changes, applied once all systems of the tick have run.
    #[inline]
    pub fn commands(&self) -> Commands<'a> {
        self.commands
    }
}
