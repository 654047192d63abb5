//! Low level storage building blocks shared by component stores and system matched sets.

pub mod index;
pub mod row;

pub use index::SparseIndex;
pub use row::Row;
