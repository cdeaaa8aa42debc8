//! Boolean circuit description.
//!
//! A circuit is an immutable tree of gates over boolean leaves. This crate
//! only describes circuits; evaluating them lives in `circuit-solver`.
//!
//! # Example
//!
//! ```
//! use circuit_core::{Circuit, Node, NodeType};
//!
//! // (a AND b) OR NOT c
//! let circuit = Circuit::new(Node::or([
//!     Node::and([Node::leaf(true), Node::leaf(false)]),
//!     Node::not(Node::leaf(false)),
//! ]));
//!
//! assert_eq!(circuit.root().node_type(), NodeType::Or);
//! assert_eq!(circuit.depth(), 2);
//! ```

pub mod circuit;
pub mod node;

pub use circuit::Circuit;
pub use node::{Node, NodeType};
