//! Cooperative stop signal for a running capture

use parking_lot::Mutex;
use pcap::BreakLoop;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared stop flag, safe to trip from a signal handler thread.
///
/// Clones share state. Once stopped a handle stays stopped. When a pcap
/// source is attached, stopping also breaks its read loop so a blocked
/// read returns without waiting for the read timeout.
#[derive(Clone, Default)]
pub struct StopHandle {
    inner: Arc<StopState>,
}

#[derive(Default)]
struct StopState {
    stopped: AtomicBool,
    breaker: Mutex<Option<BreakLoop>>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the capture to end after the packet in hand
    pub fn stop(&self) {
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("stop requested");
        if let Some(breaker) = self.inner.breaker.lock().as_ref() {
            breaker.breakloop();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Wire a pcap loop to this handle
    pub(crate) fn attach(&self, breaker: BreakLoop) {
        let mut slot = self.inner.breaker.lock();
        if self.is_stopped() {
            breaker.breakloop();
        }
        *slot = Some(breaker);
    }

    pub(crate) fn detach(&self) {
        self.inner.breaker.lock().take();
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopHandle")
            .field("stopped", &self.is_stopped())
            .field("attached", &self.inner.breaker.lock().is_some())
            .finish()
    }
}
