//! Shared cancellation token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-way flag shared by a solver and every worker it starts.
///
/// Workers check it before each blocking wait and before reporting. Once
/// set it is never cleared.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Returns `true` if this call set the flag.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
