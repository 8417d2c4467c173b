//! Host-owned debug flag
//!
//! The host sets this once it detects an attached inspector. Every publish and
//! override operation reads it first; while it is unset the bridge is inert.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared handle to the process-wide "inspector initialized" flag
#[derive(Debug, Clone, Default)]
pub struct DebugFlag(Arc<AtomicBool>);

impl DebugFlag {
    /// Create a new flag with the given initial state
    pub fn new(initialized: bool) -> Self {
        Self(Arc::new(AtomicBool::new(initialized)))
    }

    pub fn set(&self, initialized: bool) {
        self.0.store(initialized, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
