// =============================================================================
// Structural validation
// =============================================================================

use std::collections::HashSet;

use crate::comparator::KeyComparator;
use crate::error::StructureError;
use crate::node::{Item, NodeId};
use crate::{TwoFourTree, MAX_ITEMS};

struct Frame<'a, K> {
    id: NodeId,
    depth: usize,
    /// Every key in the subtree must be `>= lower` ...
    lower: Option<&'a K>,
    /// ... and `<= upper`. Equal keys may sit on both sides of a separator.
    upper: Option<&'a K>,
}

impl<K, V, C: KeyComparator<K>> TwoFourTree<K, V, C> {
    /// Walks the whole tree and reports the first broken invariant.
    ///
    /// Checks parent back-links, child counts, item counts, key order within
    /// and across nodes, uniform leaf depth, and that the arena holds no
    /// unreachable nodes. Runs in O(n); meant for tests and debugging.
    pub fn validate(&self) -> Result<(), StructureError> {
        let Some(root) = self.root else {
            if self.count != 0 {
                return Err(StructureError::SizeMismatch {
                    reported: self.count,
                    actual: 0,
                });
            }
            if self.nodes.len() != 0 {
                return Err(StructureError::LeakedNodes {
                    live: self.nodes.len(),
                    reachable: 0,
                });
            }
            return Ok(());
        };

        if self.nodes.get(root).parent.is_some() {
            return Err(StructureError::RootHasParent(root));
        }

        let mut seen: HashSet<NodeId> = HashSet::from([root]);
        let mut leaf_depth: Option<usize> = None;
        let mut item_total = 0usize;
        let mut stack = vec![Frame {
            id: root,
            depth: 0,
            lower: None,
            upper: None,
        }];

        while let Some(frame) = stack.pop() {
            let node = self.nodes.get(frame.id);
            let count = node.item_count();
            if !(1..=MAX_ITEMS).contains(&count) {
                return Err(StructureError::ItemCount {
                    node: frame.id,
                    count,
                });
            }
            item_total += count;

            let mut prev = frame.lower;
            for key in node.items.iter().map(Item::key).chain(frame.upper) {
                if let Some(prev) = prev {
                    if !self.comparator.is_greater_than_or_equal_to(key, prev) {
                        return Err(StructureError::Unsorted(frame.id));
                    }
                }
                prev = Some(key);
            }

            if node.is_leaf() {
                match leaf_depth {
                    None => leaf_depth = Some(frame.depth),
                    Some(expected) if expected != frame.depth => {
                        return Err(StructureError::UnevenDepth {
                            node: frame.id,
                            depth: frame.depth,
                            expected,
                        });
                    }
                    Some(_) => {}
                }
                continue;
            }

            if node.children.len() != count + 1 {
                return Err(StructureError::ChildCount {
                    node: frame.id,
                    items: count,
                    children: node.children.len(),
                });
            }

            for (i, &child) in node.children.iter().enumerate() {
                if !seen.insert(child) {
                    return Err(StructureError::DuplicateChild(child));
                }
                let actual = self.nodes.get(child).parent;
                if actual != Some(frame.id) {
                    return Err(StructureError::ParentMismatch {
                        parent: frame.id,
                        child,
                        actual,
                    });
                }
                stack.push(Frame {
                    id: child,
                    depth: frame.depth + 1,
                    lower: i.checked_sub(1).map(|s| node.items[s].key()).or(frame.lower),
                    upper: node.items.get(i).map(Item::key).or(frame.upper),
                });
            }
        }

        if seen.len() != self.nodes.len() {
            return Err(StructureError::LeakedNodes {
                live: self.nodes.len(),
                reachable: seen.len(),
            });
        }
        if item_total != self.count {
            return Err(StructureError::SizeMismatch {
                reported: self.count,
                actual: item_total,
            });
        }
        Ok(())
    }
}
