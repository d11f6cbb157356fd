//! # Lifecycle events emitted by the mode state machine.
//!
//! The [`EventKind`] enum classifies the twelve lifecycle events into four
//! [`Phase`]s:
//! - **Creation**: emitted once, before anything else
//! - **Enable boundary**: the robot becomes enabled in autonomous or teleop
//! - **Tick**: emitted every host tick
//! - **Disable boundary**: the robot leaves a mode
//!
//! The [`Event`] struct carries the kind plus ordering metadata.
//!
//! ## Ordering guarantees
//! Each event has a process-wide unique sequence number (`seq`) that increases
//! monotonically. Listeners see events in emission order anyway (broadcast is
//! synchronous); `seq` is useful once events are copied elsewhere (logs, queues).
//!
//! ## Example
//! ```rust
//! use robovisor::{Event, EventKind, Phase};
//!
//! let ev = Event::new(EventKind::OnAutoStart);
//! assert_eq!(ev.kind.phase(), Phase::EnableBoundary);
//! assert_eq!(ev.kind.as_label(), "on_auto_start");
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Phase an [`EventKind`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Robot creation (once, first).
    Creation,
    /// The robot becomes enabled.
    EnableBoundary,
    /// Periodic per-tick events.
    Tick,
    /// The robot leaves a mode.
    DisableBoundary,
}

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Creation ===
    /// Robot creation. Emitted exactly once, before any tick or mode change.
    OnCreate,

    // === Enable boundary ===
    /// The robot is being enabled (autonomous or teleop).
    ///
    /// Always followed by [`EventKind::OnAutoStart`] or [`EventKind::OnTeleopStart`].
    OnStart,
    /// The robot is being enabled in teleoperated mode.
    OnTeleopStart,
    /// The robot is being enabled in autonomous mode.
    OnAutoStart,

    // === Tick ===
    /// Every tick, regardless of mode.
    Execute,
    /// Every tick while disabled (after [`EventKind::Execute`]).
    ExecuteDisabled,
    /// Every tick while in teleoperated mode (after [`EventKind::Execute`]).
    ExecuteTeleop,
    /// Every tick while in autonomous mode (after [`EventKind::Execute`]).
    ExecuteAuto,

    // === Disable boundary ===
    /// Teleoperated mode has just terminated.
    OnTeleopStop,
    /// Autonomous mode has just terminated.
    OnAutoStop,
    /// The disabled state has just terminated.
    OnDisabledStop,
    /// The previous mode is over. Always preceded by a mode-specific stop.
    OnStop,
}

impl EventKind {
    /// All kinds in declaration order.
    pub const ALL: [EventKind; 12] = [
        EventKind::OnCreate,
        EventKind::OnStart,
        EventKind::OnTeleopStart,
        EventKind::OnAutoStart,
        EventKind::Execute,
        EventKind::ExecuteDisabled,
        EventKind::ExecuteTeleop,
        EventKind::ExecuteAuto,
        EventKind::OnTeleopStop,
        EventKind::OnAutoStop,
        EventKind::OnDisabledStop,
        EventKind::OnStop,
    ];

    /// Phase of this event.
    pub fn phase(self) -> Phase {
        match self {
            EventKind::OnCreate => Phase::Creation,
            EventKind::OnStart | EventKind::OnTeleopStart | EventKind::OnAutoStart => {
                Phase::EnableBoundary
            }
            EventKind::Execute
            | EventKind::ExecuteDisabled
            | EventKind::ExecuteTeleop
            | EventKind::ExecuteAuto => Phase::Tick,
            EventKind::OnTeleopStop
            | EventKind::OnAutoStop
            | EventKind::OnDisabledStop
            | EventKind::OnStop => Phase::DisableBoundary,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            EventKind::OnCreate => "on_create",
            EventKind::OnStart => "on_start",
            EventKind::OnTeleopStart => "on_teleop_start",
            EventKind::OnAutoStart => "on_auto_start",
            EventKind::Execute => "execute",
            EventKind::ExecuteDisabled => "execute_disabled",
            EventKind::ExecuteTeleop => "execute_teleop",
            EventKind::ExecuteAuto => "execute_auto",
            EventKind::OnTeleopStop => "on_teleop_stop",
            EventKind::OnAutoStop => "on_auto_stop",
            EventKind::OnDisabledStop => "on_disabled_stop",
            EventKind::OnStop => "on_stop",
        }
    }

    /// True for the per-tick kinds.
    #[inline]
    pub fn is_tick(self) -> bool {
        matches!(self.phase(), Phase::Tick)
    }
}

/// Lifecycle event with ordering metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
        }
    }

    /// Shorthand for `self.kind.phase()`.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.kind.phase()
    }
}
