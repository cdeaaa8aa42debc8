//! Circuit: a tree of nodes with a single root.

use std::sync::Arc;

use crate::node::Node;

/// A complete boolean circuit.
///
/// The circuit owns its root; every subtree is shared through `Arc` so
/// evaluators can hold on to the part they work on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    root: Arc<Node>,
}

impl Circuit {
    /// Create a circuit rooted at `root`.
    pub fn new(root: Node) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Total number of nodes, leaves included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.args());
        }
        count
    }

    /// Longest path from the root to a leaf, counted in gates.
    ///
    /// A circuit that is a single leaf has depth 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, level)) = stack.pop() {
            depth = depth.max(level);
            stack.extend(node.args().iter().map(|arg| (arg, level + 1)));
        }
        depth
    }
}

impl From<Node> for Circuit {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}
