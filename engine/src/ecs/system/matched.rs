use crate::ecs::{
    entity::Entity,
    storage::{Row, SparseIndex},
};

/// The entities a system currently tracks.
///
/// A dense list for iteration plus a sparse id index for O(1) membership, insert and
/// swap-remove. Order is arbitrary and changes as entities leave.
#[derive(Debug, Default)]
pub struct Matched {
    entities: Vec<Entity>,
    index: SparseIndex,
}

impl Matched {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set whose sparse index uses blocks of `block_size` ids.
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            entities: Vec::new(),
            index: SparseIndex::new_with_block_size(block_size),
        }
    }

    /// Track `entity`. Returns `false` if it was already tracked.
    pub(crate) fn insert(&mut self, entity: Entity) -> bool {
        if self.contains(entity) {
            return false;
        }
        self.index.insert(entity.id(), Row::new(self.entities.len()));
        self.entities.push(entity);
        true
    }

    /// Stop tracking `entity`. Returns `false` if it was not tracked.
    pub(crate) fn remove(&mut self, entity: Entity) -> bool {
        if !self.contains(entity) {
            return false;
        }
        let Some(row) = self.index.remove(entity.id()) else {
            return false;
        };

        self.entities.swap_remove(row.index());
        if let Some(moved) = self.entities.get(row.index()) {
            self.index.insert(moved.id(), row);
        }
        true
    }

    /// Check whether `entity` (with this exact generation) is tracked.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.index
            .get(entity.id())
            .is_some_and(|row| self.entities[row.index()] == entity)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }
}

impl<'a> IntoIterator for &'a Matched {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
