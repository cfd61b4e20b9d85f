//! Operator-initiated shutdown

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Flag raised by the interrupt handler
///
/// Clones share the same flag. Long-running loops poll it between blocking
/// operations and return quietly once it is set.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}
