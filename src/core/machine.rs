//! # ModeMachine: robot mode state machine.
//!
//! Owns the current [`Mode`] and turns the host's coarse notifications
//! (created / tick / enter-mode) into ordered lifecycle event sequences
//! broadcast through the [`ListenerRegistry`].
//!
//! ## Transition sequences
//! ```text
//! enter(next):
//!   next == current            → (nothing)
//!   stop due for current       → <current stop> → OnStop
//!   next is enabled            → OnStart → <next start>
//!   record current = next
//!
//! tick():
//!   Execute → <current tick event>
//! ```
//!
//! A stop is due for every mode except the initial `Disabled` the robot
//! starts in: there is nothing to stop at creation. So the first enable emits
//! only the start pair, while a later `Disabled → Autonomous` emits
//! `OnDisabledStop, OnStop, OnStart, OnAutoStart`.
//!
//! ## Rules
//! - `create()` emits `OnCreate` exactly once and must precede ticks and transitions.
//! - The mode is recorded **after** all emissions of a transition.
//! - A failing listener never aborts a sequence; all failures of the
//!   sequence are returned once it completed.

use std::sync::Arc;

use crate::error::{ListenerFailure, RuntimeError};
use crate::events::EventKind;
use crate::listeners::ListenerRegistry;

use super::mode::Mode;

/// Mode state machine driving the lifecycle broadcasts.
pub struct ModeMachine {
    registry: Arc<ListenerRegistry>,
    mode: Mode,
    created: bool,
    /// False only while in the initial `Disabled` mode.
    stop_due: bool,
}

impl ModeMachine {
    /// Creates a machine in the initial `Disabled` mode.
    pub fn new(registry: Arc<ListenerRegistry>) -> Self {
        Self {
            registry,
            mode: Mode::Disabled,
            created: false,
            stop_due: false,
        }
    }

    /// Registry the machine broadcasts to.
    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True once [`create`](Self::create) succeeded.
    pub fn is_created(&self) -> bool {
        self.created
    }

    /// Emits `OnCreate`. Must be called exactly once, before anything else.
    pub fn create(&mut self) -> Result<(), RuntimeError> {
        if self.created {
            return Err(RuntimeError::AlreadyCreated);
        }
        self.created = true;
        tracing::info!(listeners = self.registry.len(), "robot created");
        into_result(self.registry.deliver(EventKind::OnCreate))
    }

    /// Emits the per-tick pair: `Execute`, then the current mode's tick event.
    pub fn tick(&self) -> Result<(), RuntimeError> {
        into_result(self.tick_failures()?)
    }

    /// Switches to `next`, emitting the stop/start sequence.
    ///
    /// Re-entering the current mode emits nothing.
    pub fn enter(&mut self, next: Mode) -> Result<(), RuntimeError> {
        if !self.created {
            return Err(RuntimeError::NotCreated);
        }
        if next == self.mode {
            tracing::debug!(mode = next.as_label(), "mode re-entered; no transition");
            return Ok(());
        }

        let prev = self.mode;
        let mut failures = Vec::new();

        if self.stop_due {
            failures.extend(self.registry.deliver(prev.stop_event()));
            failures.extend(self.registry.deliver(EventKind::OnStop));
        }
        if let Some(start) = next.start_event() {
            failures.extend(self.registry.deliver(EventKind::OnStart));
            failures.extend(self.registry.deliver(start));
        }

        self.mode = next;
        self.stop_due = true;
        tracing::info!(
            from = prev.as_label(),
            to = next.as_label(),
            failures = failures.len(),
            "mode transition"
        );
        into_result(failures)
    }

    /// Shorthand for `enter(Mode::Disabled)`.
    pub fn enter_disabled(&mut self) -> Result<(), RuntimeError> {
        self.enter(Mode::Disabled)
    }

    /// Shorthand for `enter(Mode::Autonomous)`.
    pub fn enter_autonomous(&mut self) -> Result<(), RuntimeError> {
        self.enter(Mode::Autonomous)
    }

    /// Shorthand for `enter(Mode::Teleoperated)`.
    pub fn enter_teleop(&mut self) -> Result<(), RuntimeError> {
        self.enter(Mode::Teleoperated)
    }

    /// Runs the tick pair and returns the raw failures (used by `Robot::tick`).
    pub(crate) fn tick_failures(&self) -> Result<Vec<ListenerFailure>, RuntimeError> {
        if !self.created {
            return Err(RuntimeError::NotCreated);
        }
        let mut failures = self.registry.deliver(EventKind::Execute);
        failures.extend(self.registry.deliver(self.mode.tick_event()));
        Ok(failures)
    }
}

fn into_result(failures: Vec<ListenerFailure>) -> Result<(), RuntimeError> {
    if failures.is_empty() {
        Ok(())
    } else {
        Err(RuntimeError::ListenersFailed { failures })
    }
}
