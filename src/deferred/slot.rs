//! # DeferredSlot: at most one pending action per slot.
//!
//! Re-arming a slot cancels the action it held (if still pending) and
//! schedules the new one, atomically with respect to other `arm`/`cancel`
//! calls on the same slot.

use std::time::Duration;

use parking_lot::Mutex;

use super::handle::DeferredHandle;
use super::scheduler::DeferredScheduler;

/// A single re-armable deferred action.
pub struct DeferredSlot {
    scheduler: DeferredScheduler,
    current: Mutex<Option<DeferredHandle>>,
}

impl DeferredSlot {
    /// Creates an empty slot.
    pub fn new(scheduler: DeferredScheduler) -> Self {
        Self {
            scheduler,
            current: Mutex::new(None),
        }
    }

    /// Cancels the previous action (if pending) and arms `action` after `delay`.
    pub fn arm<F>(&self, delay: Duration, action: F) -> DeferredHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let mut current = self.current.lock();
        if let Some(prev) = current.take() {
            if prev.cancel() {
                tracing::debug!("deferred slot re-armed; previous action cancelled");
            }
        }
        let handle = self.scheduler.schedule(delay, action);
        *current = Some(handle.clone());
        handle
    }

    /// Cancels the current action. Returns `true` if a pending action was prevented.
    pub fn cancel(&self) -> bool {
        self.current
            .lock()
            .take()
            .map(|h| h.cancel())
            .unwrap_or(false)
    }

    /// True if the slot holds an action that has not fired or been cancelled.
    pub fn is_pending(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .map(DeferredHandle::is_pending)
            .unwrap_or(false)
    }
}
