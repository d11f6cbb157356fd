//! # Handle to a scheduled deferred action.
//!
//! A [`DeferredHandle`] is returned by
//! [`DeferredScheduler::schedule`](crate::DeferredScheduler::schedule) and is the
//! only way to cancel the action. Clones share the same state.
//!
//! ## State machine
//! ```text
//!            cancel()            (no-op afterwards)
//! Pending ─────────────► Cancelled
//!    │
//!    │ delay elapsed (timer task, under the state lock)
//!    ▼
//!  Fired ──► action runs while the lock is held; cancel() is a no-op
//! ```
//!
//! Both transitions happen under one lock, so either the cancel happens-before
//! dispatch (the action never runs) or it observes `Fired` and does nothing.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a deferred action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredState {
    /// Armed; the delay has not elapsed yet.
    Pending,
    /// Cancelled before firing; the action will never run.
    Cancelled,
    /// Dispatched; the action ran (or is running).
    Fired,
}

struct Shared {
    state: Mutex<DeferredState>,
    /// Wakes the timer task early once cancelled.
    token: CancellationToken,
}

/// Cancellable handle to one scheduled action.
#[derive(Clone)]
pub struct DeferredHandle {
    shared: Arc<Shared>,
}

impl DeferredHandle {
    pub(super) fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(DeferredState::Pending),
                token: CancellationToken::new(),
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> DeferredState {
        *self.shared.state.lock()
    }

    /// True while the action may still run.
    pub fn is_pending(&self) -> bool {
        self.state() == DeferredState::Pending
    }

    /// Prevents a still-pending action from running.
    ///
    /// Idempotent: cancelling twice or after firing is a no-op.
    /// Returns `true` only if this call moved the action from `Pending` to `Cancelled`.
    ///
    /// If the action is running right now, this blocks until it returns, so it
    /// must not be called from inside the action itself.
    pub fn cancel(&self) -> bool {
        let mut state = self.shared.state.lock();
        if *state != DeferredState::Pending {
            return false;
        }
        *state = DeferredState::Cancelled;
        self.shared.token.cancel();
        true
    }

    pub(super) fn token(&self) -> CancellationToken {
        self.shared.token.clone()
    }

    /// Dispatches `action` if still pending. The state lock is held while it runs.
    pub(super) fn fire<F: FnOnce()>(&self, action: F) -> bool {
        let mut state = self.shared.state.lock();
        if *state != DeferredState::Pending {
            return false;
        }
        *state = DeferredState::Fired;
        action();
        true
    }
}

impl std::fmt::Debug for DeferredHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredHandle")
            .field("state", &self.state())
            .finish()
    }
}
