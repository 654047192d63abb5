//! A sparse-set entity/component engine with bitmask system subscriptions.
//!
//! See [`ecs::World`] for the entry point.

// Allow the derive macros to resolve `::sieve_engine` paths from inside this crate.
extern crate self as sieve_engine;

pub mod ecs;
