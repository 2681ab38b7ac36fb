//! Coalesced frame requests.
//!
//! One pending flag. The first `schedule` after a frame drained the flag
//! raises it and offers a wake-up through a one-slot channel; every further
//! request before the next drain is dropped. Nothing here blocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

use parking_lot::Mutex;

#[derive(Debug, Default)]
struct SchedulerInner {
    pending: AtomicBool,
    requested: AtomicU64,
    slot: Mutex<Option<SyncSender<()>>>,
}

/// Shared handle to the pending-frame flag.
#[derive(Debug, Clone, Default)]
pub struct RenderScheduler {
    inner: Arc<SchedulerInner>,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a frame. Returns false when the request coalesced into one
    /// already pending.
    pub fn schedule(&self) -> bool {
        if self.inner.pending.swap(true, Ordering::AcqRel) {
            log::trace!("frame request coalesced");
            return false;
        }
        self.inner.requested.fetch_add(1, Ordering::Relaxed);
        self.wake();
        true
    }

    fn wake(&self) {
        let mut slot = self.inner.slot.lock();
        if let Some(tx) = slot.as_ref() {
            match tx.try_send(()) {
                Ok(()) | Err(TrySendError::Full(())) => {}
                Err(TrySendError::Disconnected(())) => *slot = None,
            }
        }
    }

    /// Drain the pending flag. The frame that drains it renders every
    /// mutation that completed before this call.
    pub fn take_pending(&self) -> bool {
        self.inner.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Total frames requested (coalesced requests are not counted).
    pub fn requested_frames(&self) -> u64 {
        self.inner.requested.load(Ordering::Relaxed)
    }

    /// Attach a wake-up receiver. At most one wake-up is ever buffered.
    /// Replaces any previously attached receiver.
    pub fn attach(&self) -> Receiver<()> {
        let (tx, rx) = sync_channel(1);
        if self.is_pending() {
            let _ = tx.try_send(());
        }
        *self.inner.slot.lock() = Some(tx);
        rx
    }
}
