//! Solver configuration.

/// Tuning knobs for a [`Solver`](crate::Solver).
///
/// Every evaluated node gets its own thread, so the per-thread stack size
/// is what bounds the memory of a large evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Stack size in bytes of every worker thread.
    pub stack_size: usize,
    /// Cancel a gate's unfinished arguments once the gate has decided.
    ///
    /// When off, those arguments run to completion and their results are
    /// discarded; only [`Solver::stop`](crate::Solver::stop) reaches them.
    pub cancel_on_short_circuit: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            stack_size: 256 * 1024,
            cancel_on_short_circuit: true,
        }
    }
}

impl SolverConfig {
    /// Create a configuration with custom values.
    pub fn new(stack_size: usize, cancel_on_short_circuit: bool) -> Self {
        Self {
            stack_size,
            cancel_on_short_circuit,
        }
    }

    /// Small stacks for very wide or deep circuits.
    pub fn lean() -> Self {
        Self {
            stack_size: 64 * 1024,
            ..Self::default()
        }
    }

    /// Let every spawned argument finish even after its gate decided.
    pub fn exhaustive() -> Self {
        Self {
            cancel_on_short_circuit: false,
            ..Self::default()
        }
    }
}
