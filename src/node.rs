// =============================================================================
// Items
// =============================================================================

/// An immutable key/element pair. Updates replace the whole item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item<K, V> {
    key: K,
    element: V,
}

impl<K, V> Item<K, V> {
    #[inline]
    pub fn new(key: K, element: V) -> Self {
        Self { key, element }
    }

    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn element(&self) -> &V {
        &self.element
    }

    #[inline]
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.element)
    }
}

// =============================================================================
// Node Arena
// =============================================================================
//
// Every node lives in a slot of `NodeArena::slots`. Child links and parent
// back-links are both `NodeId`s, so there is no ownership cycle: the arena
// owns storage, and the tree shape is defined by parent -> child links alone.
// A parent link is navigation only. A node is released when it is unlinked
// from its parent (fusion) or when the root collapses.

/// Handle to a node slot in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    /// Sorted by the tree's comparator. Holds one extra item while an
    /// overflow is being repaired and none while an underflow is.
    pub(crate) items: Vec<Item<K, V>>,
    /// Empty for a leaf, otherwise `items.len() + 1` links.
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    fn new(parent: Option<NodeId>) -> Self {
        Self {
            items: Vec::with_capacity(crate::MAX_ITEMS + 1),
            children: Vec::new(),
            parent,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub(crate) fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// Slot storage for tree nodes, with a free list of released slots.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<u32>,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    pub(crate) fn alloc(&mut self, parent: Option<NodeId>) -> NodeId {
        let node = Node::new(parent);
        if let Some(idx) = self.free.pop() {
            debug_assert!(self.slots[idx as usize].is_none());
            self.slots[idx as usize] = Some(node);
            return NodeId(idx);
        }
        let idx = u32::try_from(self.slots.len()).expect("node arena exhausted u32 index space");
        self.slots.push(Some(node));
        NodeId(idx)
    }

    /// Releases a node's slot. The node must already be unlinked from the tree.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id.index()]
            .take()
            .expect("freeing a node slot twice");
        self.free.push(id.0);
        node
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &Node<K, V> {
        self.slots[id.index()]
            .as_ref()
            .expect("dangling node id")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.slots[id.index()]
            .as_mut()
            .expect("dangling node id")
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.get_mut(id).parent = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_parts() {
        let item = Item::new(7u32, "seven");
        assert_eq!(item.key(), &7);
        assert_eq!(item.element(), &"seven");
        assert_eq!(item.into_parts(), (7, "seven"));
    }

    #[test]
    fn test_arena_reuses_freed_slots() {
        let mut arena: NodeArena<u32, ()> = NodeArena::new();
        let a = arena.alloc(None);
        let b = arena.alloc(Some(a));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(b).parent, Some(a));
        assert!(arena.get(a).is_leaf());

        arena.free(b);
        assert_eq!(arena.len(), 1);

        let c = arena.alloc(None);
        assert_eq!(c, b, "freed slot should be reused");
        assert_eq!(arena.get(c).parent, None);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    #[should_panic(expected = "freeing a node slot twice")]
    fn test_double_free_panics() {
        let mut arena: NodeArena<u32, ()> = NodeArena::new();
        let a = arena.alloc(None);
        arena.free(a);
        arena.free(a);
    }
}
