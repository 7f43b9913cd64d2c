use crate::comparator::KeyComparator;
use crate::error::Result;
use crate::TwoFourTree;

/// Keyed multiset contract: equal keys may be stored more than once, and each
/// removal takes out one of them.
pub trait Dictionary<K, V> {
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool;

    /// Element stored under an equal key, or `None`. When several items share
    /// the key, which one is returned is unspecified.
    fn find_element(&self, key: &K) -> Option<&V>;

    /// Always succeeds; duplicate keys are kept side by side.
    fn insert_element(&mut self, key: K, element: V);

    /// Removes one item with an equal key and returns its element.
    ///
    /// Fails with [`Error::ElementNotFound`](crate::Error::ElementNotFound)
    /// without touching the dictionary when no equal key exists.
    fn remove_element(&mut self, key: &K) -> Result<V>;
}

impl<K, V, C: KeyComparator<K>> Dictionary<K, V> for TwoFourTree<K, V, C> {
    #[inline]
    fn size(&self) -> usize {
        self.len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        TwoFourTree::is_empty(self)
    }

    fn find_element(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn insert_element(&mut self, key: K, element: V) {
        self.insert(key, element);
    }

    fn remove_element(&mut self, key: &K) -> Result<V> {
        self.remove(key)
    }
}
