//! Deferred structural changes.
//!
//! Systems only get value access to component stores while they run. Creating and destroying
//! entities, and adding or removing components, are queued on a [`CommandBuffer`] through the
//! [`Commands`] handle instead, and applied by the world once every system of the tick has run.
//!
//! ```text
//! tick ─► System A ──push──┐
//!         System B ──push──┼──► CommandBuffer ──flush──► World ──► pending destroys
//!         System C ──push──┘
//! ```

use crossbeam::queue::SegQueue;
use log::warn;

use crate::ecs::{
    component::Component,
    entity::Entity,
    world::{CapacityError, World},
};

type Init = Box<dyn FnOnce(&mut World, Entity) -> Result<(), CapacityError> + Send>;
type Insert = Box<dyn FnOnce(&mut World, Entity) -> Result<bool, CapacityError> + Send>;

/// A deferred world command.
pub enum Command {
    /// Create an entity and run `init` on it, typically to add its components.
    Create { init: Init },

    /// Queue an entity for destruction at the end of the tick.
    Destroy { entity: Entity },

    /// Add a component to an existing entity.
    AddComponent { entity: Entity, insert: Insert },

    /// Remove a component from an existing entity.
    RemoveComponent {
        entity: Entity,
        remove: fn(&mut World, Entity) -> bool,
    },
}

impl Command {
    /// Apply the command to the world.
    pub fn apply(self, world: &mut World) -> Result<(), CapacityError> {
        match self {
            Command::Create { init } => {
                let entity = world.create_entity();
                init(world, entity)
            }
            Command::Destroy { entity } => {
                world.destroy_entity(entity);
                Ok(())
            }
            Command::AddComponent { entity, insert } => insert(world, entity).map(|_| ()),
            Command::RemoveComponent { entity, remove } => {
                remove(world, entity);
                Ok(())
            }
        }
    }
}

/// Lock-free FIFO of deferred commands.
#[derive(Default)]
pub struct CommandBuffer {
    commands: SegQueue<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self {
            commands: SegQueue::new(),
        }
    }

    /// Push a command to the buffer.
    pub fn push(&self, command: Command) {
        self.commands.push(command);
    }

    /// Number of queued commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drain all commands in FIFO order.
    pub fn drain(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(self.commands.len());
        while let Some(command) = self.commands.pop() {
            commands.push(command);
        }
        commands
    }

    /// Apply all queued commands to the world in the order they were pushed.
    ///
    /// A command that fails on a full type registry is logged and skipped.
    pub fn flush(&self, world: &mut World) {
        for command in self.drain() {
            if let Err(error) = command.apply(world) {
                warn!("Dropped deferred command: {error}");
            }
        }
    }
}

/// Handle systems use to queue structural changes.
#[derive(Clone, Copy)]
pub struct Commands<'a> {
    buffer: &'a CommandBuffer,
}

impl<'a> Commands<'a> {
    pub fn new(buffer: &'a CommandBuffer) -> Self {
        Self { buffer }
    }

    /// Create an entity once the systems of this tick have run.
    ///
    /// ```ignore
    /// commands.create(|world, entity| {
    ///     world.add_component(entity, Position::default())?;
    ///     Ok(())
    /// });
    /// ```
    pub fn create<F>(&self, init: F)
    where
        F: FnOnce(&mut World, Entity) -> Result<(), CapacityError> + Send + 'static,
    {
        self.buffer.push(Command::Create {
            init: Box::new(init),
        });
    }

    /// Destroy an entity at the end of this tick.
    pub fn destroy(&self, entity: Entity) {
        self.buffer.push(Command::Destroy { entity });
    }

    /// Add a component to an entity once the systems of this tick have run.
    pub fn add_component<C: Component>(&self, entity: Entity, component: C) {
        self.buffer.push(Command::AddComponent {
            entity,
            insert: Box::new(move |world, entity| world.add_component(entity, component)),
        });
    }

    /// Remove a component from an entity once the systems of this tick have run.
    pub fn remove_component<C: Component>(&self, entity: Entity) {
        self.buffer.push(Command::RemoveComponent {
            entity,
            remove: remove_component::<C>,
        });
    }
}

fn remove_component<C: Component>(world: &mut World, entity: Entity) -> bool {
    world.remove_component::<C>(entity).is_some()
}
