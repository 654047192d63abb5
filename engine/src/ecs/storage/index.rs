use crate::ecs::{entity, storage::row::Row};

/// A block-based sparse index from entity ids to dense rows.
///
/// The id space is divided into fixed-size blocks and memory is only allocated for blocks that
/// hold at least one entry. Within a block a plain vec stores the mapping, giving O(1) lookup with
/// good cache locality for the dense, recycled id ranges an [`entity::Manager`] hands out.
///
/// # Performance Characteristics
///
/// | Operation | Time | Memory |
/// |-----------|------|--------|
/// | `insert()` | O(1) amortized | Allocates block on first use |
/// | `get()` | O(1) | No allocation |
/// | `remove()` | O(1) | No deallocation (leaves `None`) |
///
/// # Block Size Tuning
///
/// - **Small blocks (64-128)**: Lower memory overhead when few ids of a wide range are indexed
/// - **Default (256)**: Balanced for typical entity creation patterns
/// - **Large blocks (512-1024)**: Fewer indirections when most ids carry the component
///
/// # Example
///
/// ```ignore
/// let mut index = SparseIndex::new_with_block_size(4);
///
/// index.insert(Id::from(0), Row::new(0));   // Block 0
/// index.insert(Id::from(9), Row::new(1));   // Block 2, block 1 stays unallocated
///
/// assert_eq!(index.get(Id::from(9)), Some(Row::new(1)));
/// assert_eq!(index.get(Id::from(5)), None);
/// ```
#[derive(Debug)]
pub struct SparseIndex {
    /// The size of blocks to allocate when growing the index.
    block_size: usize,

    /// Outer Vec is indexed by `id / block_size`, inner Vec by `id % block_size`.
    blocks: Vec<Option<Box<[Option<Row>]>>>,
}

impl SparseIndex {
    /// Default block size balances memory usage and access speed for typical entity patterns.
    pub const DEFAULT_BLOCK_SIZE: usize = 256;

    /// Create a new index with the default block size.
    #[inline]
    pub const fn new() -> Self {
        Self::new_with_block_size(Self::DEFAULT_BLOCK_SIZE)
    }

    /// Create a new index with a custom block size. A block size of 0 is treated as 1.
    #[inline]
    pub const fn new_with_block_size(block_size: usize) -> Self {
        Self {
            block_size: if block_size == 0 { 1 } else { block_size },
            blocks: Vec::new(),
        }
    }

    /// Calculate block and within-block indices for an id.
    #[inline]
    fn indices(&self, id: entity::Id) -> (usize, usize) {
        let index = id.index();
        (index / self.block_size, index % self.block_size)
    }

    /// Map `id` to `row`, replacing any previous mapping.
    pub fn insert(&mut self, id: entity::Id, row: Row) {
        let (block_index, within_block_index) = self.indices(id);

        if block_index >= self.blocks.len() {
            self.blocks.resize_with(block_index + 1, || None);
        }

        let block_size = self.block_size;
        let block = self.blocks[block_index]
            .get_or_insert_with(|| vec![None; block_size].into_boxed_slice());
        block[within_block_index] = Some(row);
    }

    /// Get the row mapped to `id`, if any.
    #[inline]
    pub fn get(&self, id: entity::Id) -> Option<Row> {
        let (block_index, within_block_index) = self.indices(id);
        let block = self.blocks.get(block_index)?.as_ref()?;
        block[within_block_index]
    }

    /// Remove the mapping for `id`, returning the old row if it existed.
    #[inline]
    pub fn remove(&mut self, id: entity::Id) -> Option<Row> {
        let (block_index, within_block_index) = self.indices(id);
        let block = self.blocks.get_mut(block_index)?.as_mut()?;
        block[within_block_index].take()
    }

    #[inline]
    pub fn contains(&self, id: entity::Id) -> bool {
        self.get(id).is_some()
    }

    /// Drop every mapping and release all blocks.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}

impl Default for SparseIndex {
    /// Custom default to ensure we get the default block size.
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: u32) -> entity::Id {
        entity::Id::from(value)
    }

    fn row(index: usize) -> Option<Row> {
        Some(Row::new(index))
    }

    fn block_count(index: &SparseIndex) -> usize {
        index.blocks.len()
    }

    fn allocated_block_count(index: &SparseIndex) -> usize {
        index.blocks.iter().filter(|b| b.is_some()).count()
    }

    #[test]
    fn single_block() {
        // Given
        let mut index = SparseIndex::new_with_block_size(10);

        // When
        index.insert(id(0), 10.into());
        index.insert(id(5), 40.into());
        index.insert(id(9), 80.into());

        // Then
        assert_eq!(block_count(&index), 1);
        assert_eq!(index.get(id(0)), row(10));
        assert_eq!(index.get(id(1)), None);
        assert_eq!(index.get(id(5)), row(40));
        assert_eq!(index.get(id(9)), row(80));
    }

    #[test]
    fn block_skipping() {
        // Given
        let mut index = SparseIndex::new_with_block_size(4);

        // When
        index.insert(id(0), 10.into());
        index.insert(id(9), 80.into());

        // Then - grows to 3 blocks with the middle block left unallocated
        assert_eq!(block_count(&index), 3);
        assert_eq!(allocated_block_count(&index), 2);
        assert_eq!(index.get(id(5)), None);
    }

    #[test]
    fn remove() {
        // Given
        let mut index = SparseIndex::new();
        index.insert(id(0), 100.into());
        index.insert(id(1), 200.into());
        index.insert(id(2), 300.into());

        // When - remove existing
        let removed = index.remove(id(1));

        // Then
        assert_eq!(removed, row(200));
        assert_eq!(index.get(id(1)), None);
        assert_eq!(index.get(id(0)), row(100));
        assert_eq!(index.get(id(2)), row(300));

        // When - remove missing, including ids beyond any block
        assert_eq!(index.remove(id(3)), None);
        assert_eq!(index.remove(id(100_000)), None);
    }

    #[test]
    fn overwrite_and_contains() {
        // Given
        let mut index = SparseIndex::new();
        index.insert(id(5), 100.into());

        // When
        index.insert(id(5), 200.into());

        // Then
        assert_eq!(index.get(id(5)), row(200));
        assert!(index.contains(id(5)));
        assert!(!index.contains(id(6)));
    }

    #[test]
    fn clear_releases_blocks() {
        // Given
        let mut index = SparseIndex::new_with_block_size(8);
        for i in 0..100 {
            index.insert(id(i), Row::new(i as usize));
        }

        // When
        index.clear();

        // Then
        assert_eq!(block_count(&index), 0);
        assert_eq!(index.get(id(42)), None);
    }

    #[test]
    fn zero_block_size_is_clamped() {
        // Given
        let mut index = SparseIndex::new_with_block_size(0);

        // When
        index.insert(id(3), 7.into());

        // Then
        assert_eq!(index.get(id(3)), row(7));
        assert_eq!(block_count(&index), 4);
        assert_eq!(allocated_block_count(&index), 1);
    }
}
