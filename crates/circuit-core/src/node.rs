//! Gate and leaf nodes of a boolean circuit.

use std::sync::Arc;
use std::time::Duration;

/// Kind of a circuit node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Boolean constant, no arguments.
    Leaf,
    /// Conjunction of all arguments.
    And,
    /// Disjunction of all arguments.
    Or,
    /// Negation of a single argument.
    Not,
    /// `if args[0] then args[1] else args[2]`.
    If,
    /// True when more than `threshold` arguments are true.
    Gt,
    /// True when fewer than `threshold` arguments are true.
    Lt,
}

impl NodeType {
    /// Check if this kind carries a threshold.
    pub fn is_threshold(self) -> bool {
        matches!(self, NodeType::Gt | NodeType::Lt)
    }
}

/// A node in the boolean circuit.
///
/// Nodes are immutable once built. Arguments are reference counted so a
/// subtree can be handed to another thread without copying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    node_type: NodeType,
    args: Vec<Arc<Node>>,
    value: Option<bool>,
    threshold: Option<usize>,
    delay: Duration,
}

impl Node {
    /// Constant leaf, available immediately.
    pub fn leaf(value: bool) -> Self {
        Self::delayed_leaf(value, Duration::ZERO)
    }

    /// Constant leaf whose value takes `delay` to become available.
    ///
    /// Models an expensive input; evaluators may abandon the wait when the
    /// computation is cancelled.
    pub fn delayed_leaf(value: bool, delay: Duration) -> Self {
        Self {
            node_type: NodeType::Leaf,
            args: Vec::new(),
            value: Some(value),
            threshold: None,
            delay,
        }
    }

    /// Gate of the given kind over `args`.
    ///
    /// No arity or threshold checks are made here. Threshold gates built
    /// this way have no threshold; use [`Node::gt`] and [`Node::lt`] for
    /// those.
    pub fn gate(node_type: NodeType, args: impl IntoIterator<Item = Node>) -> Self {
        Self {
            node_type,
            args: args.into_iter().map(Arc::new).collect(),
            value: None,
            threshold: None,
            delay: Duration::ZERO,
        }
    }

    pub fn and(args: impl IntoIterator<Item = Node>) -> Self {
        Self::gate(NodeType::And, args)
    }

    pub fn or(args: impl IntoIterator<Item = Node>) -> Self {
        Self::gate(NodeType::Or, args)
    }

    pub fn not(arg: Node) -> Self {
        Self::gate(NodeType::Not, [arg])
    }

    pub fn if_then_else(condition: Node, then: Node, otherwise: Node) -> Self {
        Self::gate(NodeType::If, [condition, then, otherwise])
    }

    /// Threshold gate: true iff more than `threshold` arguments are true.
    pub fn gt(threshold: usize, args: impl IntoIterator<Item = Node>) -> Self {
        Self {
            threshold: Some(threshold),
            ..Self::gate(NodeType::Gt, args)
        }
    }

    /// Threshold gate: true iff fewer than `threshold` arguments are true.
    pub fn lt(threshold: usize, args: impl IntoIterator<Item = Node>) -> Self {
        Self {
            threshold: Some(threshold),
            ..Self::gate(NodeType::Lt, args)
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Ordered arguments. Empty for leaves.
    pub fn args(&self) -> &[Arc<Node>] {
        &self.args
    }

    /// Leaf constant, `None` for gates.
    pub fn value(&self) -> Option<bool> {
        self.value
    }

    /// Threshold of a GT/LT gate, `None` otherwise.
    pub fn threshold(&self) -> Option<usize> {
        self.threshold
    }

    /// Time a leaf takes to produce its value.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_leaf(&self) -> bool {
        self.node_type == NodeType::Leaf
    }
}
