//! Robot operating modes.

use crate::events::EventKind;

/// Robot operating mode.
///
/// Exactly one mode is current at any time; the robot starts `Disabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Not enabled (initial mode).
    #[default]
    Disabled,
    /// Enabled, running autonomously.
    Autonomous,
    /// Enabled, driven by an operator.
    Teleoperated,
}

impl Mode {
    /// True for the enabled modes.
    #[inline]
    pub fn is_enabled(self) -> bool {
        !matches!(self, Mode::Disabled)
    }

    /// Event emitted when this mode is left.
    pub fn stop_event(self) -> EventKind {
        match self {
            Mode::Disabled => EventKind::OnDisabledStop,
            Mode::Autonomous => EventKind::OnAutoStop,
            Mode::Teleoperated => EventKind::OnTeleopStop,
        }
    }

    /// Mode-specific event emitted after `OnStart` when this mode is entered.
    ///
    /// `Disabled` has none.
    pub fn start_event(self) -> Option<EventKind> {
        match self {
            Mode::Disabled => None,
            Mode::Autonomous => Some(EventKind::OnAutoStart),
            Mode::Teleoperated => Some(EventKind::OnTeleopStart),
        }
    }

    /// Mode-specific event emitted after `Execute` on every tick.
    pub fn tick_event(self) -> EventKind {
        match self {
            Mode::Disabled => EventKind::ExecuteDisabled,
            Mode::Autonomous => EventKind::ExecuteAuto,
            Mode::Teleoperated => EventKind::ExecuteTeleop,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            Mode::Disabled => "disabled",
            Mode::Autonomous => "autonomous",
            Mode::Teleoperated => "teleoperated",
        }
    }
}
