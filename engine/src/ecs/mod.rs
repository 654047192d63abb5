pub mod component;
pub mod entity;
pub mod filter;
pub mod mask;
pub mod storage;
pub mod system;
pub(crate) mod util;
pub mod world;

pub use component::Component;
pub use entity::Entity;
pub use filter::Filter;
pub use mask::Mask;
pub use system::System;
pub use world::{CapacityError, Config, World};
