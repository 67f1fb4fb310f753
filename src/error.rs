use thiserror::Error;

/// Errors reported by the tree collections.
///
/// Every error is returned synchronously by the operation that triggered it.
/// A failed operation never leaves a partially modified tree behind.
#[derive(Error, Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// A key-based lookup or removal found no matching element.
    #[error("key not found")]
    KeyNotFound,

    /// A positional access was outside `[-len, len)`.
    #[error("index {index} out of range for collection of length {len}")]
    IndexOutOfRange { index: isize, len: usize },

    /// The value has no position in the total order (for example a `NaN` float).
    #[error("unorderable key of kind `{0}`")]
    UnorderableKey(&'static str),

    /// The operation needs at least one element.
    #[error("collection is empty")]
    EmptyContainer,

    /// A B-tree minimum degree below 2 was requested.
    #[error("invalid minimum degree {0}, must be at least 2")]
    InvalidDegree(usize),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
