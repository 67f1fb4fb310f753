use crate::error::{Error, Result};

#[cfg(test)]
const DEFAULT_MIN_DEGREE: usize = 3;
#[cfg(not(test))]
const DEFAULT_MIN_DEGREE: usize = 16;

/// The minimum degree `t` of the B-tree backing a collection.
///
/// Every node other than the root holds between `t - 1` and `2t - 1` entries,
/// and every internal node has one more child than it has entries.
///
/// # Examples
///
/// ```
/// use tree_collections::{Degree, TreeMap};
///
/// let degree = Degree::new(4).unwrap();
/// assert_eq!(degree.max_keys(), 7);
///
/// let map: TreeMap<i64, i64> = TreeMap::with_degree(degree);
/// assert!(map.is_empty());
///
/// assert!(Degree::new(1).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Degree(usize);

impl Degree {
    /// The degree used by `new()` constructors.
    pub const DEFAULT: Self = Self(DEFAULT_MIN_DEGREE);

    /// Creates a degree, rejecting values below 2 or so large that a node's
    /// child count `2t` does not fit in a `usize`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDegree`] if `min_degree < 2` or `2 * min_degree`
    /// overflows.
    pub const fn new(min_degree: usize) -> Result<Self> {
        if min_degree < 2 || min_degree.checked_mul(2).is_none() {
            return Err(Error::InvalidDegree(min_degree));
        }
        Ok(Self(min_degree))
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Fewest entries a non-root node may hold.
    #[must_use]
    pub const fn min_keys(self) -> usize {
        self.0 - 1
    }

    /// Most entries any node may hold.
    #[must_use]
    pub const fn max_keys(self) -> usize {
        2 * self.0 - 1
    }
}

impl Default for Degree {
    fn default() -> Self {
        Self::DEFAULT
    }
}
