//! A first-class cancellation signal for drain loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A clonable cancellation flag.
///
/// Requesting cancellation is sticky: once set, every clone observes it.
/// Drain loops check the signal between pulls, so a request takes effect
/// at the next iteration boundary rather than interrupting an in-flight
/// pull.
#[derive(Clone, Debug, Default)]
pub struct CancelSignal {
    requested: Arc<AtomicBool>,
}

impl CancelSignal {
    /// Create a signal with no cancellation requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
