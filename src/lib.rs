//! # two-four-tree
//!
//! An ordered multimap backed by a 2-4 tree: every node holds 1 to 3 sorted
//! items and has either no children or exactly one more child than items,
//! with all leaves at the same depth.
//!
//! Key order is supplied by a [`KeyComparator`] injected at construction.
//! Equal keys may be inserted any number of times.
//!
//! ## Example
//!
//! ```rust
//! use two_four_tree::TwoFourTree;
//!
//! let mut tree: TwoFourTree<u32, &str> = TwoFourTree::new();
//! tree.insert(47, "a");
//! tree.insert(83, "b");
//! tree.insert(22, "c");
//!
//! assert_eq!(tree.get(&83), Some(&"b"));
//! assert_eq!(tree.remove(&47), Ok("a"));
//! assert!(tree.remove(&47).is_err());
//! assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![22, 83]);
//! ```

use log::trace;

mod comparator;
mod dictionary;
mod error;
mod node;
mod validate;

pub use comparator::{FnComparator, KeyComparator, NaturalOrder, ReverseOrder};
pub use dictionary::Dictionary;
pub use error::{Error, Result, StructureError};
pub use node::{Item, NodeId};

use node::NodeArena;

// =============================================================================
// Configuration
// =============================================================================

/// Most items a node holds once an operation has completed.
pub const MAX_ITEMS: usize = 3;
/// Most children an internal node holds once an operation has completed.
pub const MAX_CHILDREN: usize = MAX_ITEMS + 1;

// =============================================================================
// TwoFourTree
// =============================================================================

/// An ordered multimap backed by a 2-4 tree.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]; a child's
/// parent link is a plain index and never keeps anything alive.
#[derive(Clone)]
pub struct TwoFourTree<K, V, C = NaturalOrder> {
    nodes: NodeArena<K, V>,
    root: Option<NodeId>,
    count: usize,
    comparator: C,
}

impl<K, V, C: Default> TwoFourTree<K, V, C> {
    pub fn new() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C> TwoFourTree<K, V, C> {
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            nodes: NodeArena::new(),
            root: None,
            count: 0,
            comparator,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Number of levels; `0` for an empty tree, `1` for a lone root leaf.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(id) = current {
            height += 1;
            current = self.nodes.get(id).children.first().copied();
        }
        height
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.count = 0;
    }

    /// In-order traversal. Equal keys come out adjacent, in tree order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            nodes: &self.nodes,
            stack: Vec::new(),
            remaining: self.count,
        };
        if let Some(root) = self.root {
            iter.push_left_spine(root);
        }
        iter
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Index of the slot in the parent's child list that holds `id`.
    fn index_in_parent(&self, id: NodeId) -> usize {
        let parent = self
            .nodes
            .get(id)
            .parent
            .expect("index_in_parent called on the root");
        self.nodes
            .get(parent)
            .children
            .iter()
            .position(|&child| child == id)
            .expect("child missing from its parent's links")
    }

    /// Follows `children[0]` down to a leaf.
    fn leftmost_leaf(&self, mut id: NodeId) -> NodeId {
        while let Some(&first) = self.nodes.get(id).children.first() {
            id = first;
        }
        id
    }
}

impl<K, V, C: KeyComparator<K>> TwoFourTree<K, V, C> {
    pub fn get(&self, key: &K) -> Option<&V> {
        if self.root.is_none() {
            return None;
        }

        let node = self.nodes.get(self.search(key));
        node.items
            .iter()
            .find(|item| self.comparator.is_equal(item.key(), key))
            .map(Item::element)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, key: K, element: V) {
        if self.root.is_none() {
            self.root = Some(self.nodes.alloc(None));
        }

        let mut node = self.search(&key);
        let mut idx = self.first_gte(node, &key);

        // Search only stops at an internal node on an equal key. The new item
        // then goes to the front of that item's in-order successor leaf.
        let successor = {
            let n = self.nodes.get(node);
            (!n.is_leaf()).then(|| n.children[idx + 1])
        };
        if let Some(right) = successor {
            node = self.leftmost_leaf(right);
            idx = 0;
        }

        self.nodes
            .get_mut(node)
            .items
            .insert(idx, Item::new(key, element));
        self.count += 1;
        self.fix_overflow(node);
    }

    pub fn remove(&mut self, key: &K) -> Result<V> {
        if self.root.is_none() {
            return Err(Error::ElementNotFound);
        }

        let node = self.search(key);
        let idx = self.first_gte(node, key);
        let successor = {
            let n = self.nodes.get(node);
            let found = n
                .items
                .get(idx)
                .is_some_and(|item| self.comparator.is_equal(item.key(), key));
            if !found {
                debug_assert!(n.is_leaf(), "search stopped at an internal node without a match");
                return Err(Error::ElementNotFound);
            }
            (!n.is_leaf()).then(|| n.children[idx + 1])
        };

        let (removed, short) = match successor {
            None => (self.nodes.get_mut(node).items.remove(idx), node),
            Some(right) => {
                let leaf = self.leftmost_leaf(right);
                let replacement = self.nodes.get_mut(leaf).items.remove(0);
                let removed =
                    std::mem::replace(&mut self.nodes.get_mut(node).items[idx], replacement);
                (removed, leaf)
            }
        };

        self.count -= 1;
        self.fix_underflow(short);

        let (_, element) = removed.into_parts();
        Ok(element)
    }

    /// Index of the first item in `id` whose key is `>= key`, or the item
    /// count if there is none.
    fn first_gte(&self, id: NodeId, key: &K) -> usize {
        let items = &self.nodes.get(id).items;
        items
            .iter()
            .position(|item| self.comparator.is_greater_than_or_equal_to(item.key(), key))
            .unwrap_or(items.len())
    }

    /// Node holding an item equal to `key`, or else the leaf where `key`
    /// belongs.
    fn search(&self, key: &K) -> NodeId {
        let mut current = self.root.expect("search on an empty tree");
        loop {
            let idx = self.first_gte(current, key);
            let node = self.nodes.get(current);
            if node
                .items
                .get(idx)
                .is_some_and(|item| self.comparator.is_equal(item.key(), key))
            {
                return current;
            }
            match node.children.get(idx) {
                Some(&child) => current = child,
                None => return current,
            }
        }
    }

    /// Splits `node` while it holds more than [`MAX_ITEMS`] items, walking up
    /// through the parents. Grows the tree by one level when the root splits.
    fn fix_overflow(&mut self, mut node: NodeId) {
        while self.nodes.get(node).item_count() > MAX_ITEMS {
            let parent = match self.nodes.get(node).parent {
                Some(parent) => parent,
                None => {
                    let root = self.nodes.alloc(None);
                    self.nodes.get_mut(root).children.push(node);
                    self.nodes.set_parent(node, Some(root));
                    self.root = Some(root);
                    trace!("root {node:?} overflowed, new root {root:?}");
                    root
                }
            };
            let idx = self.index_in_parent(node);

            let n = self.nodes.get_mut(node);
            let to_sibling = n.items.pop().expect("overflowing node has items");
            let to_parent = n.items.pop().expect("overflowing node has items");
            let moved = if n.is_leaf() {
                None
            } else {
                let right = n.children.pop().expect("internal node has children");
                let left = n.children.pop().expect("internal node has children");
                Some((left, right))
            };

            let sibling = self.nodes.alloc(Some(parent));
            let s = self.nodes.get_mut(sibling);
            s.items.push(to_sibling);
            if let Some((left, right)) = moved {
                s.children.push(left);
                s.children.push(right);
                self.nodes.set_parent(left, Some(sibling));
                self.nodes.set_parent(right, Some(sibling));
            }

            let p = self.nodes.get_mut(parent);
            p.items.insert(idx, to_parent);
            p.children.insert(idx + 1, sibling);
            trace!("split {node:?}, new sibling {sibling:?} under {parent:?}");

            node = parent;
        }
    }

    /// Repairs a node left with no items, walking up through the parents
    /// while fusions keep emptying them.
    fn fix_underflow(&mut self, mut node: NodeId) {
        while self.nodes.get(node).item_count() == 0 {
            let Some(parent) = self.nodes.get(node).parent else {
                let old = self.nodes.free(node);
                debug_assert!(old.children.len() <= 1);
                self.root = old.children.first().copied();
                if let Some(root) = self.root {
                    self.nodes.set_parent(root, None);
                }
                trace!("root {node:?} collapsed, new root {:?}", self.root);
                return;
            };

            let idx = self.index_in_parent(node);
            let siblings = &self.nodes.get(parent).children;
            let left = idx.checked_sub(1).map(|i| siblings[i]);
            let right = siblings.get(idx + 1).copied();

            if let Some(left) = left {
                if self.nodes.get(left).item_count() >= 2 {
                    self.transfer_from_left(node, left, parent, idx);
                    return;
                }
            }
            if let Some(right) = right {
                if self.nodes.get(right).item_count() >= 2 {
                    self.transfer_from_right(node, right, parent, idx);
                    return;
                }
            }

            match (left, right) {
                (Some(left), _) => self.fuse_into_left(node, left, parent, idx),
                (None, Some(right)) => self.fuse_into_right(node, right, parent, idx),
                (None, None) => unreachable!("non-root node {node:?} has no siblings"),
            }
            node = parent;
        }
    }

    fn transfer_from_left(&mut self, node: NodeId, left: NodeId, parent: NodeId, idx: usize) {
        let l = self.nodes.get_mut(left);
        let up = l.items.pop().expect("lending sibling has items");
        let moved = l.children.pop();

        let down = std::mem::replace(&mut self.nodes.get_mut(parent).items[idx - 1], up);

        let n = self.nodes.get_mut(node);
        n.items.insert(0, down);
        if let Some(child) = moved {
            n.children.insert(0, child);
            self.nodes.set_parent(child, Some(node));
        }
        trace!("transfer {left:?} -> {node:?} through {parent:?}");
    }

    fn transfer_from_right(&mut self, node: NodeId, right: NodeId, parent: NodeId, idx: usize) {
        let r = self.nodes.get_mut(right);
        let up = r.items.remove(0);
        let moved = (!r.is_leaf()).then(|| r.children.remove(0));

        let down = std::mem::replace(&mut self.nodes.get_mut(parent).items[idx], up);

        let n = self.nodes.get_mut(node);
        n.items.push(down);
        if let Some(child) = moved {
            n.children.push(child);
            self.nodes.set_parent(child, Some(node));
        }
        trace!("transfer {right:?} -> {node:?} through {parent:?}");
    }

    fn fuse_into_left(&mut self, node: NodeId, left: NodeId, parent: NodeId, idx: usize) {
        let p = self.nodes.get_mut(parent);
        let separator = p.items.remove(idx - 1);
        p.children.remove(idx);
        let emptied = self.nodes.free(node);

        let l = self.nodes.get_mut(left);
        l.items.push(separator);
        if let Some(&child) = emptied.children.first() {
            l.children.push(child);
            self.nodes.set_parent(child, Some(left));
        }
        trace!("fuse {node:?} into left sibling {left:?}");
    }

    fn fuse_into_right(&mut self, node: NodeId, right: NodeId, parent: NodeId, idx: usize) {
        let p = self.nodes.get_mut(parent);
        let separator = p.items.remove(idx);
        p.children.remove(idx);
        let emptied = self.nodes.free(node);

        let r = self.nodes.get_mut(right);
        r.items.insert(0, separator);
        if let Some(&child) = emptied.children.first() {
            r.children.insert(0, child);
            self.nodes.set_parent(child, Some(right));
        }
        trace!("fuse {node:?} into right sibling {right:?}");
    }
}

impl<K, V, C: Default> Default for TwoFourTree<K, V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: KeyComparator<K>> Extend<(K, V)> for TwoFourTree<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, element) in iter {
            self.insert(key, element);
        }
    }
}

impl<K, V, C: KeyComparator<K> + Default> FromIterator<(K, V)> for TwoFourTree<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug, C> std::fmt::Debug for TwoFourTree<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Iteration
// =============================================================================

pub struct Iter<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    /// Path from the root: (node, index of the next item to yield).
    stack: Vec<(NodeId, usize)>,
    remaining: usize,
}

impl<K, V> Iter<'_, K, V> {
    fn push_left_spine(&mut self, mut id: NodeId) {
        loop {
            self.stack.push((id, 0));
            match self.nodes.get(id).children.first() {
                Some(&child) => id = child,
                None => break,
            }
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        loop {
            let top = self.stack.last_mut()?;
            let (id, idx) = *top;
            let node = nodes.get(id);
            if idx == node.items.len() {
                self.stack.pop();
                continue;
            }
            top.1 += 1;

            if let Some(&child) = node.children.get(idx + 1) {
                self.push_left_spine(child);
            }
            self.remaining -= 1;
            let item = &node.items[idx];
            return Some((item.key(), item.element()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, C> IntoIterator for &'a TwoFourTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod proptests;
