use crate::error::{Error, Result};

/// A zero-based rank into the sorted order of a collection.
///
/// # Examples
///
/// ```
/// use tree_collections::{Rank, TreeMap};
///
/// let mut map = TreeMap::new();
/// map.insert("a", 10).unwrap();
/// map.insert("b", 20).unwrap();
///
/// assert_eq!(map[Rank(0)], 10);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub usize);

/// Resolves a possibly negative `index` against a collection of length `len`.
///
/// Negative indices count from the end, so `-1` names the last element.
pub(crate) fn resolve_index(index: isize, len: usize) -> Result<usize> {
    let resolved = if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        Some(index.unsigned_abs())
    };
    match resolved {
        Some(rank) if rank < len => Ok(rank),
        _ => Err(Error::IndexOutOfRange { index, len }),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn resolves_bounds() {
        assert_eq!(resolve_index(0, 3), Ok(0));
        assert_eq!(resolve_index(-1, 3), Ok(2));
        assert_eq!(resolve_index(-3, 3), Ok(0));
        assert_eq!(resolve_index(3, 3), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
        assert_eq!(resolve_index(-4, 3), Err(Error::IndexOutOfRange { index: -4, len: 3 }));
        assert_eq!(resolve_index(0, 0), Err(Error::IndexOutOfRange { index: 0, len: 0 }));
        assert!(resolve_index(isize::MIN, usize::MAX).is_ok());
    }

    proptest! {
        #[test]
        fn negative_mirrors_positive(len in 1usize..10_000, offset in 1usize..10_000) {
            prop_assume!(offset <= len);
            let negative = resolve_index(-(offset as isize), len).unwrap();
            prop_assert_eq!(negative, len - offset);
        }
    }
}
