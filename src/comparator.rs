use std::cmp::Ordering;

/// Total order over keys, supplied to a tree at construction.
///
/// Implementations must be consistent: `is_equal` must be an equivalence and
/// `is_greater_than_or_equal_to` a total preorder agreeing with it. A tree
/// built on an inconsistent comparator will not panic on its own account, but
/// lookups and traversal order become meaningless.
pub trait KeyComparator<K> {
    fn is_equal(&self, a: &K, b: &K) -> bool;

    /// Returns `true` when `a >= b`.
    fn is_greater_than_or_equal_to(&self, a: &K, b: &K) -> bool;
}

/// Ascending order given by `K: Ord`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord> KeyComparator<K> for NaturalOrder {
    #[inline]
    fn is_equal(&self, a: &K, b: &K) -> bool {
        a == b
    }

    #[inline]
    fn is_greater_than_or_equal_to(&self, a: &K, b: &K) -> bool {
        a >= b
    }
}

/// Descending order given by `K: Ord`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReverseOrder;

impl<K: Ord> KeyComparator<K> for ReverseOrder {
    #[inline]
    fn is_equal(&self, a: &K, b: &K) -> bool {
        a == b
    }

    #[inline]
    fn is_greater_than_or_equal_to(&self, a: &K, b: &K) -> bool {
        a <= b
    }
}

/// Adapts a three-way comparison closure.
///
/// ```rust
/// use two_four_tree::{FnComparator, TwoFourTree};
///
/// // Case-insensitive keys.
/// let cmp = FnComparator::new(|a: &String, b: &String| {
///     a.to_lowercase().cmp(&b.to_lowercase())
/// });
/// let mut tree = TwoFourTree::with_comparator(cmp);
/// tree.insert("Hello".to_string(), 1);
/// assert_eq!(tree.get(&"HELLO".to_string()), Some(&1));
/// ```
#[derive(Clone, Copy)]
pub struct FnComparator<F> {
    cmp: F,
}

impl<F> FnComparator<F> {
    pub fn new(cmp: F) -> Self {
        Self { cmp }
    }
}

impl<K, F> KeyComparator<K> for FnComparator<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn is_equal(&self, a: &K, b: &K) -> bool {
        (self.cmp)(a, b) == Ordering::Equal
    }

    #[inline]
    fn is_greater_than_or_equal_to(&self, a: &K, b: &K) -> bool {
        (self.cmp)(a, b) != Ordering::Less
    }
}

impl<F> std::fmt::Debug for FnComparator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnComparator")
    }
}
