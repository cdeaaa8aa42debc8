//! One-shot handle to a circuit's eventual value.

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crate::error::SolveError;
use crate::outcome::Outcome;
use crate::task::Signal;

#[derive(Debug)]
enum State {
    /// Waiting for the root evaluator.
    Pending(Receiver<Signal>),
    /// The root reported.
    Ready(Outcome),
    /// The root evaluator exited without reporting.
    Lost,
}

/// Eventual value of a submitted circuit.
///
/// Returned by [`Solver::solve`](crate::Solver::solve) before evaluation
/// finishes. [`CircuitValue::get`] consumes the handle, so the value is read
/// at most once.
#[derive(Debug)]
pub struct CircuitValue {
    state: State,
}

impl CircuitValue {
    pub(crate) fn pending(results: Receiver<Signal>) -> Self {
        Self {
            state: State::Pending(results),
        }
    }

    /// Handle that is already resolved to broken.
    pub(crate) fn broken() -> Self {
        Self {
            state: State::Ready(Outcome::Broken),
        }
    }

    /// Block until the circuit is evaluated.
    ///
    /// # Errors
    ///
    /// - [`SolveError::Broken`] if the evaluation was cancelled or a subtree
    ///   it depended on could not be evaluated.
    /// - [`SolveError::Disconnected`] if the evaluator vanished without a
    ///   result.
    pub fn get(self) -> Result<bool, SolveError> {
        match self.state {
            State::Ready(outcome) => outcome.into(),
            State::Lost => Err(SolveError::Disconnected),
            State::Pending(results) => match results.recv() {
                Ok(signal) => signal.outcome().into(),
                Err(_) => Err(SolveError::Disconnected),
            },
        }
    }

    /// Wait up to `timeout` for the value. Returns whether it is available.
    ///
    /// A value that arrives is kept for [`CircuitValue::get`].
    pub fn wait_timeout(&mut self, timeout: Duration) -> bool {
        if let State::Pending(results) = &self.state {
            self.state = match results.recv_timeout(timeout) {
                Ok(signal) => State::Ready(signal.outcome()),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => State::Lost,
            };
        }
        true
    }

    /// Check without blocking whether the value is available.
    pub fn is_ready(&mut self) -> bool {
        if let State::Pending(results) = &self.state {
            self.state = match results.try_recv() {
                Ok(signal) => State::Ready(signal.outcome()),
                Err(TryRecvError::Empty) => return false,
                Err(TryRecvError::Disconnected) => State::Lost,
            };
        }
        true
    }
}
