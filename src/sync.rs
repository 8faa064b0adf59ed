//! Synchronization primitives shared between the engine process and its
//! stream pumps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A thread-safe flag telling the stream pumps to stop delivering lines.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Create a new stop flag (initially not stopped).
    #[must_use]
    pub fn new() -> Self {
        StopFlag(Arc::new(AtomicBool::new(false)))
    }

    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the flag. Returns `true` if this call was the one that set it.
    #[inline]
    pub fn stop(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }
}
