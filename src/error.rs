use thiserror::Error;

use crate::node::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("element is not in tree")]
    ElementNotFound,

    #[error("tree structure is corrupt: {0}")]
    Structure(#[from] StructureError),
}

/// A broken structural invariant, as reported by [`TwoFourTree::validate`].
///
/// [`TwoFourTree::validate`]: crate::TwoFourTree::validate
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("root {0:?} has a parent link")]
    RootHasParent(NodeId),

    #[error("node {node:?} holds {count} items")]
    ItemCount { node: NodeId, count: usize },

    #[error("internal node {node:?} has {children} children for {items} items")]
    ChildCount {
        node: NodeId,
        items: usize,
        children: usize,
    },

    #[error("child {child:?} of {parent:?} points back to {actual:?}")]
    ParentMismatch {
        parent: NodeId,
        child: NodeId,
        actual: Option<NodeId>,
    },

    #[error("node {0:?} is linked as a child more than once")]
    DuplicateChild(NodeId),

    #[error("keys out of order at node {0:?}")]
    Unsorted(NodeId),

    #[error("leaf {node:?} at depth {depth}, expected {expected}")]
    UnevenDepth {
        node: NodeId,
        depth: usize,
        expected: usize,
    },

    #[error("{live} live nodes but only {reachable} reachable from the root")]
    LeakedNodes { live: usize, reachable: usize },

    #[error("tree reports {reported} items but holds {actual}")]
    SizeMismatch { reported: usize, actual: usize },
}
