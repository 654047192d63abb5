/// A dense row. An index into the packed entity and value vecs of a sparse set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Row(usize);

impl From<usize> for Row {
    /// Get a row From a usize index.
    fn from(value: usize) -> Self {
        Self::new(value)
    }
}

impl Row {
    /// Construct a new row from an index.
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the index used in the dense vecs.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0
    }
}
