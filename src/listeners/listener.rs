//! # Lifecycle listener trait.
//!
//! Provides [`Listen`] the extension point for plugging subsystems into the
//! robot lifecycle.
//!
//! ## Architecture
//! ```text
//! ModeMachine ──► ListenerRegistry::broadcast(kind)
//!                     ├──► listener1.on_event(&Event)
//!                     ├──► listener2.on_event(&Event)   (registration order)
//!                     └──► listenerN.on_event(&Event)
//!                              └─► panic caught → ListenerFailure
//! ```
//!
//! ## Rules
//! - Handlers run **synchronously** on the tick thread; one slow handler stalls
//!   every other listener for that tick, so handlers must not block.
//! - A panicking handler does not stop delivery to the remaining listeners;
//!   the failure is returned to whoever drove the broadcast.
//! - The registry only holds a weak reference: dropping the last `Arc` of a
//!   listener silently unregisters it.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use robovisor::{Event, EventKind, Listen, ListenerRegistry};
//!
//! #[derive(Default)]
//! struct TickCounter(AtomicU32);
//!
//! impl Listen for TickCounter {
//!     fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::Execute {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "tick-counter" }
//! }
//!
//! let registry = ListenerRegistry::new();
//! let counter = Arc::new(TickCounter::default());
//! registry.register(&counter);
//! registry.broadcast(EventKind::Execute).unwrap();
//! assert_eq!(counter.0.load(Ordering::Relaxed), 1);
//! ```

use crate::events::Event;

/// Lifecycle listener.
///
/// A single entry point receives every event; match on
/// [`Event::kind`](crate::Event) and ignore the kinds you do not care about.
///
/// ### Implementation requirements
/// - Return quickly; never block the calling thread.
/// - Use interior mutability for state (handlers take `&self`).
pub trait Listen: Send + Sync + 'static {
    /// Handles a single lifecycle event.
    fn on_event(&self, event: &Event);

    /// Returns the listener name used in logs and [`ListenerFailure`](crate::ListenerFailure).
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
