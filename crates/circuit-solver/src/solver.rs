//! Entry point: submit circuits, stop all evaluation.

use std::sync::mpsc;
use std::sync::Arc;

use circuit_core::Circuit;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::config::SolverConfig;
use crate::task::{Context, Task};
use crate::value::CircuitValue;

/// Concurrent circuit solver.
///
/// A solver accepts circuits until [`Solver::stop`] is called. Stopping is
/// permanent: it cancels every evaluation still running, and every later
/// [`Solver::solve`] returns a handle that is already broken.
///
/// `solve` and `stop` take `&self`; share a solver between threads with an
/// `Arc`.
#[derive(Debug, Default)]
pub struct Solver {
    token: CancellationToken,
    config: SolverConfig,
    /// Root tasks of evaluations that may still be running.
    roots: Mutex<Vec<Arc<Task>>>,
}

impl Solver {
    /// Create a solver with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Whether [`Solver::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Start evaluating `circuit` and return a handle to its value.
    ///
    /// Never blocks. After [`Solver::stop`] no work is started and the
    /// handle reports [`SolveError::Broken`](crate::SolveError::Broken).
    pub fn solve(&self, circuit: &Circuit) -> CircuitValue {
        if self.is_stopped() {
            debug!("solver stopped; rejecting circuit");
            return CircuitValue::broken();
        }

        let (out, results) = mpsc::channel();
        let ctx = Context {
            token: self.token.clone(),
            config: self.config,
        };
        let (root, worker) = Task::new(Arc::clone(circuit.root()), 0, 0, out, ctx);
        {
            let mut roots = self.roots.lock();
            // `stop` sets the token before taking this lock: either it sees
            // the new root or the root is never started.
            if self.is_stopped() {
                debug!("solver stopped while submitting; rejecting circuit");
                return CircuitValue::broken();
            }
            roots.retain(|task| !task.is_finished());
            roots.push(root);
        }

        debug!(
            nodes = circuit.node_count(),
            depth = circuit.depth(),
            "solving circuit"
        );
        // A failed start still resolves the handle, to broken.
        if let Err(fault) = worker.start() {
            warn!(%fault, "root worker not started");
        }
        CircuitValue::pending(results)
    }

    /// Stop accepting circuits and cancel all running evaluations.
    ///
    /// Never blocks; cancelled handles resolve to broken shortly after.
    /// Calling it again has no effect.
    pub fn stop(&self) {
        if !self.token.cancel() {
            return;
        }
        let roots = std::mem::take(&mut *self.roots.lock());
        debug!(running = roots.len(), "stopping solver");
        for root in roots {
            root.cancel();
        }
    }
}
