//! Error types for circuit solving.

use circuit_core::NodeType;
use thiserror::Error;

/// Errors reported when reading a circuit's value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    /// The evaluation was cancelled, or a subtree could not be evaluated.
    #[error("circuit evaluation was cancelled or broken")]
    Broken,

    /// The root evaluator exited without reporting a result.
    #[error("circuit evaluator exited without a result")]
    Disconnected,
}

/// Faults local to a single node evaluator.
///
/// These never escape the evaluator: each one is logged and the node
/// reports [`Outcome::Broken`](crate::Outcome::Broken) instead.
#[derive(Debug, Error)]
pub enum EvalFault {
    /// Cancellation was requested while the node was waiting or starting.
    #[error("evaluation interrupted")]
    Interrupted,

    /// The node cannot be evaluated as described.
    #[error("malformed {node_type:?} node with {arity} argument(s)")]
    Malformed { node_type: NodeType, arity: usize },

    /// An argument reported with an index the gate does not have.
    #[error("unexpected argument index {0}")]
    UnexpectedIndex(usize),

    /// The worker thread for an argument could not be started.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}
