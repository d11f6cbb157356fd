//! # AutoBrake: hold brakes while enabled, release them after a grace period.
//!
//! ## Architecture
//! ```text
//! ModeMachine ── OnStart ──► AutoBrake ── cancel pending release
//!                                      └─ set_brake_mode(true)  on every device
//!
//! ModeMachine ── OnStop  ──► AutoBrake ── arm release after `grace`
//!                                              │ (DeferredSlot, timer task)
//!                                              ▼
//!                                         set_brake_mode(false) on every device
//! ```
//!
//! ## Rules
//! - Re-enabling within the grace period aborts the release; brakes stay engaged.
//! - A later stop re-arms the release (replacing any pending one).
//! - The device set is an identity set; the lock is held only to read or
//!   mutate it, never while calling into devices.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use robovisor::{AutoBrake, BrakeDevice, DeferredScheduler, ListenerRegistry};
//!
//! struct Motor;
//! impl BrakeDevice for Motor {
//!     fn set_brake_mode(&self, _enabled: bool) {}
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = ListenerRegistry::new();
//! let brakes = Arc::new(AutoBrake::new(DeferredScheduler::try_current().unwrap()));
//! let motor = Arc::new(Motor);
//! brakes.add(motor.clone());
//! registry.register(&brakes);
//! assert!(brakes.contains(&motor));
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::{RobotConfig, DEFAULT_BRAKE_GRACE};
use crate::deferred::{DeferredScheduler, DeferredSlot};
use crate::events::{Event, EventKind};
use crate::listeners::Listen;

use super::device::BrakeDevice;

type DeviceSet = Arc<Mutex<Vec<Arc<dyn BrakeDevice>>>>;

/// Brake-safety listener.
pub struct AutoBrake {
    devices: DeviceSet,
    release: DeferredSlot,
    grace: Duration,
}

impl AutoBrake {
    /// Creates a listener with the default 5 s grace period.
    pub fn new(scheduler: DeferredScheduler) -> Self {
        Self::with_grace(scheduler, DEFAULT_BRAKE_GRACE)
    }

    /// Creates a listener using `config.brake_grace`.
    pub fn with_config(scheduler: DeferredScheduler, config: &RobotConfig) -> Self {
        Self::with_grace(scheduler, config.brake_grace)
    }

    /// Creates a listener with an explicit grace period.
    pub fn with_grace(scheduler: DeferredScheduler, grace: Duration) -> Self {
        Self {
            devices: Arc::new(Mutex::new(Vec::new())),
            release: DeferredSlot::new(scheduler),
            grace,
        }
    }

    /// Adds a device. Returns `false` if it was already present.
    pub fn add(&self, device: Arc<dyn BrakeDevice>) -> bool {
        let mut devices = self.devices.lock();
        if devices.iter().any(|d| same(d, &device)) {
            return false;
        }
        tracing::debug!(device = device.name(), "brake device added");
        devices.push(device);
        true
    }

    /// Removes a device. Returns `false` if it was not present.
    pub fn remove<D: BrakeDevice + ?Sized>(&self, device: &Arc<D>) -> bool {
        let mut devices = self.devices.lock();
        let before = devices.len();
        devices.retain(|d| !same(d, device));
        let removed = devices.len() != before;
        if removed {
            tracing::debug!(device = device.name(), "brake device removed");
        }
        removed
    }

    /// True if `device` is in the set.
    pub fn contains<D: BrakeDevice + ?Sized>(&self, device: &Arc<D>) -> bool {
        self.devices.lock().iter().any(|d| same(d, device))
    }

    /// Number of devices.
    pub fn len(&self) -> usize {
        self.devices.lock().len()
    }

    /// True if no device is registered.
    pub fn is_empty(&self) -> bool {
        self.devices.lock().is_empty()
    }

    /// Grace period before release.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// True while a release is scheduled and has not fired.
    pub fn is_release_pending(&self) -> bool {
        self.release.is_pending()
    }

    fn engage(&self) {
        if self.release.cancel() {
            tracing::debug!("pending brake release aborted");
        }
        set_all(&self.devices, true);
    }

    fn schedule_release(&self) {
        let devices = Arc::clone(&self.devices);
        self.release
            .arm(self.grace, move || set_all(&devices, false));
        tracing::debug!(grace_ms = self.grace.as_millis() as u64, "brake release armed");
    }
}

impl Listen for AutoBrake {
    fn on_event(&self, event: &Event) {
        match event.kind {
            EventKind::OnStart => self.engage(),
            EventKind::OnStop => self.schedule_release(),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "auto-brake"
    }
}

fn same<D: BrakeDevice + ?Sized>(a: &Arc<dyn BrakeDevice>, b: &Arc<D>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

fn set_all(devices: &Mutex<Vec<Arc<dyn BrakeDevice>>>, enabled: bool) {
    let snapshot = devices.lock().clone();
    for device in &snapshot {
        device.set_brake_mode(enabled);
    }
    tracing::debug!(enabled, devices = snapshot.len(), "brake mode applied");
}
