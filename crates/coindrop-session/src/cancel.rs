//! Cooperative cancellation for the view stream.
//!
//! Cancellation is a request, not an interrupt. The stream checks the flag
//! only between reads, so a read that is already pending keeps waiting
//! until the next frame arrives or the transport begins closing. True
//! preemption would need the transport itself to abort a read.
//!
//! ```text
//!   Running ──request()──→ CancelRequested ──(stream stops)──→ Cancelled
//! ```

use std::sync::Arc;

use tokio::sync::watch;

/// Where a cancellation request stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelState {
    Running,
    CancelRequested,
    Cancelled,
}

/// Shared handle for requesting and observing cancellation.
///
/// Clones share the same state.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<CancelState>>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CancelState::Running);
        Self { tx: Arc::new(tx) }
    }

    /// Asks the stream to stop at its next check. Idempotent.
    pub fn request(&self) {
        self.tx.send_if_modified(|state| {
            if *state == CancelState::Running {
                *state = CancelState::CancelRequested;
                true
            } else {
                false
            }
        });
    }

    pub fn state(&self) -> CancelState {
        *self.tx.borrow()
    }

    /// `true` once cancellation has been requested (or completed).
    pub fn is_requested(&self) -> bool {
        self.state() != CancelState::Running
    }

    pub(crate) fn mark_cancelled(&self) {
        self.tx.send_replace(CancelState::Cancelled);
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}
