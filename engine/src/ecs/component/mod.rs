//! Component types and their storage.
//!
//! Components are plain data attached to entities, at most one value per type per entity. Every
//! component type gets its own [`ComponentStore`], a packed sparse set, and the [`Components`]
//! registry owns one store per registered type.
//!
//! ## Usage
//!
//! ```ignore
//! use sieve_engine::ecs::{Component, World};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut world = World::new();
//! let entity = world.create_entity();
//! world.add_component(entity, Position { x: 0.0, y: 0.0 })?;
//! ```

mod registry;
mod store;

pub use registry::{Components, Transition};
pub use store::{ComponentStore, ValuesMut};

/// A trait representing a component in the ECS.
///
/// At present this only sets the required trait bounds for a type to be used as a component.
/// Use `#[derive(Component)]` to implement it.
pub trait Component: 'static + Sized + Send + Sync {}
