//! # DeferredScheduler: one-shot, cancellable delayed actions.
//!
//! Each [`schedule`](DeferredScheduler::schedule) call spawns one timer task on
//! the scheduler's tokio runtime:
//!
//! ```text
//! schedule(delay, action) ──► spawn ──► select! {
//!                                         sleep(delay)      → handle.fire(action)
//!                                         token.cancelled() → exit
//!                                       }
//! ```
//!
//! ## Rules
//! - The action runs in a timer task, never inside the `schedule` call.
//!   Only a multi-thread runtime puts it on a different OS thread; on a
//!   `current_thread` runtime it runs on the thread driving that runtime.
//! - An action fires at most once.
//! - Panics inside the action unwind the timer task only; the scheduler does
//!   not catch or retry them.

use std::time::Duration;

use tokio::{runtime::Handle, select, time};

use crate::error::RuntimeError;

use super::handle::DeferredHandle;

/// Spawns cancellable delayed actions on a tokio runtime.
///
/// Cheap to clone; clones spawn on the same runtime.
#[derive(Clone, Debug)]
pub struct DeferredScheduler {
    runtime: Handle,
}

impl DeferredScheduler {
    /// Creates a scheduler spawning timers on `runtime`.
    ///
    /// The runtime must have the time driver enabled. Use a multi-thread
    /// runtime when actions must fire off the tick thread.
    pub fn new(runtime: Handle) -> Self {
        Self { runtime }
    }

    /// Creates a scheduler on the runtime of the current context.
    ///
    /// Fails with [`RuntimeError::NoRuntime`] outside of a tokio runtime.
    pub fn try_current() -> Result<Self, RuntimeError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| RuntimeError::NoRuntime)
    }

    /// Arms a one-shot timer running `action` after `delay`.
    pub fn schedule<F>(&self, delay: Duration, action: F) -> DeferredHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = DeferredHandle::new();
        let timer = handle.clone();
        let token = handle.token();

        self.runtime.spawn(async move {
            let sleep = time::sleep(delay);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {
                    if timer.fire(action) {
                        tracing::trace!(delay_ms = delay.as_millis() as u64, "deferred action fired");
                    }
                }
                _ = token.cancelled() => {
                    tracing::trace!("deferred action cancelled");
                }
            }
        });

        handle
    }

    /// Cancels `handle`; see [`DeferredHandle::cancel`].
    pub fn cancel(&self, handle: &DeferredHandle) -> bool {
        handle.cancel()
    }
}
