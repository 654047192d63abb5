use crate::ecs::{entity, storage::SparseIndex};

/// Tuning knobs of a [`World`](super::World).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Capacity a component store starts with and never shrinks below.
    pub initial_capacity: usize,
    /// Number of released entity ids kept in the recycle pool.
    pub recycle_limit: usize,
    /// Ids per block of the sparse entity indexes. 0 is treated as 1.
    pub index_block_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: 8,
            recycle_limit: entity::Manager::DEFAULT_RECYCLE_LIMIT,
            index_block_size: SparseIndex::DEFAULT_BLOCK_SIZE,
        }
    }
}
