//! Concurrent evaluation of boolean circuits.
//!
//! Every node of a circuit is evaluated on its own thread. A gate starts
//! its arguments in parallel and decides as soon as the arguments that have
//! reported determine its value: `AND` stops at the first false argument,
//! `GT(t)` once more than `t` arguments are true, and so on. Results are
//! tri-state ([`Outcome`]): an evaluation that is cancelled or cannot be
//! carried out is `Broken`, and a broken argument breaks its gate unless
//! the gate has already decided.
//!
//! [`Solver::stop`] cancels everything still running and makes the solver
//! refuse further circuits.
//!
//! # Example
//!
//! ```
//! use circuit_core::{Circuit, Node};
//! use circuit_solver::Solver;
//!
//! // GT(1): more than one argument is true.
//! let circuit = Circuit::new(Node::gt(
//!     1,
//!     [Node::leaf(true), Node::leaf(false), Node::leaf(true)],
//! ));
//!
//! let solver = Solver::new();
//! let value = solver.solve(&circuit);
//! assert_eq!(value.get(), Ok(true));
//! ```
//!
//! # Cancellation
//!
//! ```
//! use std::time::Duration;
//!
//! use circuit_core::{Circuit, Node};
//! use circuit_solver::{SolveError, Solver};
//!
//! let solver = Solver::new();
//! let slow = Circuit::new(Node::and([
//!     Node::leaf(true),
//!     Node::delayed_leaf(true, Duration::from_secs(60)),
//! ]));
//!
//! let value = solver.solve(&slow);
//! solver.stop();
//! assert_eq!(value.get(), Err(SolveError::Broken));
//!
//! // A stopped solver rejects new work.
//! let value = solver.solve(&Circuit::new(Node::leaf(true)));
//! assert_eq!(value.get(), Err(SolveError::Broken));
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod outcome;
pub mod policy;
pub mod solver;
mod task;
pub mod value;

pub use cancel::CancellationToken;
pub use config::SolverConfig;
pub use error::{EvalFault, SolveError};
pub use outcome::{IndexedOutcome, Outcome};
pub use policy::Policy;
pub use solver::Solver;
pub use value::CircuitValue;
