//! # ListenerRegistry: synchronous fan-out over registered listeners
//!
//! [`ListenerRegistry`] distributes each lifecycle event to every registered
//! [`Listen`] implementation, in registration order, on the calling thread.
//!
//! ## What it guarantees
//! - `broadcast(kind)` invokes exactly one handler call per registration.
//! - Registration order is delivery order.
//! - Panics inside listeners are caught, logged and returned after every
//!   other listener was notified (isolation without swallowing).
//! - `register`/`unregister` are safe from inside a handler or from another
//!   thread while a broadcast is in progress.
//!
//! ## What it does **not** guarantee
//! - A listener registered or unregistered *during* a broadcast may or may not
//!   observe that same event (the pass iterates the snapshot taken at its start).
//! - No retries: a failed handler is not called again for the same event.
//!
//! ## Diagram
//! ```text
//!    broadcast(kind)
//!        │  snapshot = Arc<Vec<Entry>>  (copy-on-write, lock released)
//!        ├──► upgrade(weak L1) ─► L1.on_event(&ev) ─► catch_unwind
//!        ├──► upgrade(weak L2) ─► (dropped listener: skipped)
//!        └──► upgrade(weak LN) ─► LN.on_event(&ev) ─► catch_unwind
//!                                                        └─► ListenerFailure
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::error::{ListenerFailure, RuntimeError};
use crate::events::{Event, EventKind};

use super::Listen;

/// One registration: a non-owning reference plus its name for diagnostics.
#[derive(Clone)]
struct Entry {
    listener: Weak<dyn Listen>,
    name: &'static str,
}

impl Entry {
    fn is_alive(&self) -> bool {
        self.listener.strong_count() > 0
    }

    fn points_to(&self, target: *const ()) -> bool {
        std::ptr::eq(self.listener.as_ptr() as *const (), target)
    }
}

/// Insertion-ordered, copy-on-write registry of lifecycle listeners.
///
/// Mutations build a new list and swap it in; broadcasts iterate whichever list
/// was current when they started. The lock is only held for the swap or the
/// `Arc` clone, never while a handler runs.
///
/// Registering the same listener twice yields two notifications per event;
/// treat it as a caller error.
pub struct ListenerRegistry {
    entries: RwLock<Arc<Vec<Entry>>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Registers a listener (non-owning).
    pub fn register<L: Listen>(&self, listener: &Arc<L>) {
        let weak: Weak<dyn Listen> = Arc::downgrade(listener) as Weak<dyn Listen>;
        self.insert(Entry {
            listener: weak,
            name: listener.name(),
        });
    }

    /// Registers an already type-erased listener (non-owning).
    pub fn register_dyn(&self, listener: &Arc<dyn Listen>) {
        self.insert(Entry {
            listener: Arc::downgrade(listener),
            name: listener.name(),
        });
    }

    /// Removes the first registration of `listener`.
    ///
    /// Returns `false` if the listener was not registered.
    pub fn unregister<L: Listen>(&self, listener: &Arc<L>) -> bool {
        self.remove(Arc::as_ptr(listener) as *const ())
    }

    /// Type-erased counterpart of [`unregister`](Self::unregister).
    pub fn unregister_dyn(&self, listener: &Arc<dyn Listen>) -> bool {
        self.remove(Arc::as_ptr(listener) as *const ())
    }

    /// Number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().iter().filter(|e| e.is_alive()).count()
    }

    /// True if no live listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of live registrations in delivery order (debugging aid).
    pub fn names(&self) -> Vec<&'static str> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| e.name)
            .collect()
    }

    /// Delivers `kind` to every registered listener, in registration order.
    ///
    /// All listeners are notified even if some of them panic; the panics are
    /// then returned as [`RuntimeError::ListenersFailed`].
    pub fn broadcast(&self, kind: EventKind) -> Result<(), RuntimeError> {
        let failures = self.deliver(kind);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(RuntimeError::ListenersFailed { failures })
        }
    }

    /// Delivers `kind` and returns the failures instead of wrapping them.
    pub(crate) fn deliver(&self, kind: EventKind) -> Vec<ListenerFailure> {
        let event = Event::new(kind);
        let snapshot = Arc::clone(&*self.entries.read());

        let mut failures = Vec::new();
        for entry in snapshot.iter() {
            let Some(listener) = entry.listener.upgrade() else {
                continue;
            };
            let res = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));
            if let Err(payload) = res {
                let message = panic_message(payload.as_ref());
                tracing::warn!(
                    listener = entry.name,
                    event = kind.as_label(),
                    seq = event.seq,
                    %message,
                    "listener panicked"
                );
                failures.push(ListenerFailure {
                    event: kind,
                    listener: entry.name,
                    message,
                });
            }
        }
        failures
    }

    fn insert(&self, entry: Entry) {
        tracing::debug!(listener = entry.name, "listener registered");
        let mut guard = self.entries.write();
        let mut next: Vec<Entry> = guard.iter().filter(|e| e.is_alive()).cloned().collect();
        next.push(entry);
        *guard = Arc::new(next);
    }

    fn remove(&self, target: *const ()) -> bool {
        let mut guard = self.entries.write();
        let Some(pos) = guard.iter().position(|e| e.points_to(target)) else {
            return false;
        };
        let mut next: Vec<Entry> = Vec::with_capacity(guard.len());
        for (i, e) in guard.iter().enumerate() {
            if i != pos && e.is_alive() {
                next.push(e.clone());
            }
        }
        tracing::debug!(listener = guard[pos].name, "listener unregistered");
        *guard = Arc::new(next);
        true
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a panic payload as text.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    type Log = Arc<Mutex<Vec<(&'static str, EventKind)>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Listen for Recorder {
        fn on_event(&self, event: &Event) {
            self.log.lock().push((self.name, event.kind));
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    struct Panicker;

    impl Listen for Panicker {
        fn on_event(&self, _event: &Event) {
            panic!("boom");
        }

        fn name(&self) -> &'static str {
            "panicker"
        }
    }

    fn recorder(name: &'static str, log: &Log) -> Arc<Recorder> {
        Arc::new(Recorder {
            name,
            log: Arc::clone(log),
        })
    }

    #[test]
    fn test_delivery_follows_registration_order() {
        let log: Log = Arc::default();
        let reg = ListenerRegistry::new();
        let a = recorder("a", &log);
        let b = recorder("b", &log);
        reg.register(&a);
        reg.register(&b);

        reg.broadcast(EventKind::OnStart).unwrap();
        assert_eq!(
            *log.lock(),
            vec![("a", EventKind::OnStart), ("b", EventKind::OnStart)]
        );
        assert_eq!(reg.names(), vec!["a", "b"]);
    }

    #[test]
    fn test_panicking_listener_is_isolated_and_surfaced() {
        let log: Log = Arc::default();
        let reg = ListenerRegistry::new();
        let a = recorder("a", &log);
        let p = Arc::new(Panicker);
        let b = recorder("b", &log);
        reg.register(&a);
        reg.register(&p);
        reg.register(&b);

        let err = reg.broadcast(EventKind::OnStop).unwrap_err();
        let failures = err.listener_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].listener, "panicker");
        assert_eq!(failures[0].event, EventKind::OnStop);
        assert_eq!(failures[0].message, "boom");
        assert_eq!(log.lock().len(), 2, "listeners after the panic still notified");
    }

    #[test]
    fn test_registry_does_not_keep_listeners_alive() {
        let log: Log = Arc::default();
        let reg = ListenerRegistry::new();
        let a = recorder("a", &log);
        reg.register(&a);
        assert_eq!(reg.len(), 1);

        let weak = Arc::downgrade(&a);
        drop(a);
        assert!(weak.upgrade().is_none());
        assert!(reg.is_empty());
        reg.broadcast(EventKind::Execute).unwrap();
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_double_registration_notifies_twice() {
        let log: Log = Arc::default();
        let reg = ListenerRegistry::new();
        let a = recorder("a", &log);
        reg.register(&a);
        reg.register(&a);
        reg.broadcast(EventKind::Execute).unwrap();
        assert_eq!(log.lock().len(), 2);

        assert!(reg.unregister(&a));
        reg.broadcast(EventKind::Execute).unwrap();
        assert_eq!(log.lock().len(), 3);
    }

    #[test]
    fn test_unregister_unknown_returns_false() {
        let log: Log = Arc::default();
        let reg = ListenerRegistry::new();
        let a = recorder("a", &log);
        assert!(!reg.unregister(&a));
    }

    struct SelfRemover {
        registry: Arc<ListenerRegistry>,
        me: Mutex<Option<Arc<dyn Listen>>>,
        log: Log,
    }

    impl Listen for SelfRemover {
        fn on_event(&self, event: &Event) {
            self.log.lock().push(("remover", event.kind));
            if let Some(me) = self.me.lock().take() {
                self.registry.unregister_dyn(&me);
            }
        }
    }

    #[test]
    fn test_unregister_from_inside_handler() {
        let log: Log = Arc::default();
        let reg = Arc::new(ListenerRegistry::new());
        let remover = Arc::new(SelfRemover {
            registry: Arc::clone(&reg),
            me: Mutex::new(None),
            log: Arc::clone(&log),
        });
        let as_dyn: Arc<dyn Listen> = remover.clone();
        *remover.me.lock() = Some(Arc::clone(&as_dyn));
        let after = recorder("after", &log);

        reg.register_dyn(&as_dyn);
        reg.register(&after);

        reg.broadcast(EventKind::Execute).unwrap();
        reg.broadcast(EventKind::ExecuteTeleop).unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                ("remover", EventKind::Execute),
                ("after", EventKind::Execute),
                ("after", EventKind::ExecuteTeleop),
            ]
        );
    }

    struct Adder {
        registry: Arc<ListenerRegistry>,
        pending: Mutex<Option<Arc<Recorder>>>,
    }

    impl Listen for Adder {
        fn on_event(&self, _event: &Event) {
            if let Some(next) = self.pending.lock().take() {
                self.registry.register(&next);
            }
        }
    }

    #[test]
    fn test_register_from_inside_handler() {
        let log: Log = Arc::default();
        let reg = Arc::new(ListenerRegistry::new());
        let late = recorder("late", &log);
        let adder = Arc::new(Adder {
            registry: Arc::clone(&reg),
            pending: Mutex::new(Some(Arc::clone(&late))),
        });
        reg.register(&adder);

        reg.broadcast(EventKind::OnCreate).unwrap();
        assert!(log.lock().is_empty(), "late listener not part of the running pass");

        reg.broadcast(EventKind::Execute).unwrap();
        assert_eq!(*log.lock(), vec![("late", EventKind::Execute)]);
    }

    #[test]
    fn test_register_and_unregister_from_another_thread_during_broadcasts() {
        use std::sync::atomic::{AtomicBool, Ordering};

        const ROUNDS: usize = 500;
        let log: Log = Arc::default();
        let churn_log: Log = Arc::default();
        let reg = ListenerRegistry::new();
        let stable = recorder("stable", &log);
        reg.register(&stable);
        let done = AtomicBool::new(false);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let temp = recorder("temp", &churn_log);
                    reg.register(&temp);
                    std::thread::yield_now();
                    assert!(reg.unregister(&temp));
                }
            });
            for _ in 0..ROUNDS {
                reg.broadcast(EventKind::Execute).unwrap();
            }
            done.store(true, Ordering::Release);
        });

        let seen = log.lock();
        assert_eq!(seen.len(), ROUNDS);
        assert!(seen.iter().all(|e| *e == ("stable", EventKind::Execute)));
        assert_eq!(reg.names(), vec!["stable"]);
    }
}
