//! Deferred actions: cancellable one-shot timers.
//!
//! ## Contents
//! - [`DeferredScheduler`] spawns timer tasks on a tokio runtime
//! - [`DeferredHandle`] / [`DeferredState`] cancel and inspect one action
//! - [`DeferredSlot`] one re-armable action (re-arming replaces the pending one)
//!
//! This is the only part of the crate that runs code off the tick thread.
//! Anything an action touches that the tick thread also touches must be
//! behind a lock (see `AutoBrake`).

mod handle;
mod scheduler;
mod slot;

pub use handle::{DeferredHandle, DeferredState};
pub use scheduler::DeferredScheduler;
pub use slot::DeferredSlot;
