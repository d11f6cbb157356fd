//! # Global robot configuration.
//!
//! Provides [`RobotConfig`] centralized settings for the robot runtime.
//!
//! Config is used in three ways:
//! 1. **Driver loop**: `Driver::new(robot)` reads `tick_period` and `mode_queue_capacity`
//! 2. **Brake safety**: `AutoBrake::with_config(scheduler, &config)` reads `brake_grace`
//! 3. **Command defaults**: `CommandAdapter::with_defaults(command, &config)`
//!
//! ## Sentinel values
//! - `command_timeout = 0s` → no timeout (treated as `None`)
//! - `tick_period = 0s` → clamped to 1 ms (a zero-period interval is invalid)
//! - `mode_queue_capacity = 0` → clamped to 1

use std::time::Duration;

/// Grace period between disabling the robot and releasing the brakes.
pub const DEFAULT_BRAKE_GRACE: Duration = Duration::from_secs(5);

/// Nominal host tick period.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(20);

/// Global configuration for the robot runtime.
///
/// ## Field semantics
/// - `tick_period`: period of the driver loop (`0s` = clamped to 1 ms)
/// - `brake_grace`: delay before brakes are released after a stop
/// - `command_timeout`: default per-command timeout (`0s` = no timeout)
/// - `mode_queue_capacity`: buffered mode requests in the driver (min 1)
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct RobotConfig {
    /// Period between two host ticks in the driver loop.
    pub tick_period: Duration,

    /// How long brakes stay engaged after the robot is disabled.
    ///
    /// Re-enabling within this window aborts the pending release.
    pub brake_grace: Duration,

    /// Default command timeout.
    ///
    /// - `Duration::ZERO` = no timeout (command runs until it reports finished)
    /// - `> 0` = the scheduler ends the command once it has run this long
    ///
    /// Used by `CommandAdapter::with_defaults()`. Can be overridden per command.
    pub command_timeout: Duration,

    /// Capacity of the driver's mode-request channel.
    pub mode_queue_capacity: usize,
}

impl RobotConfig {
    /// Returns the default command timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → timeout applied per command
    #[inline]
    pub fn default_command_timeout(&self) -> Option<Duration> {
        if self.command_timeout == Duration::ZERO {
            None
        } else {
            Some(self.command_timeout)
        }
    }

    /// Returns a tick period of at least 1 ms.
    #[inline]
    pub fn tick_period_clamped(&self) -> Duration {
        self.tick_period.max(Duration::from_millis(1))
    }

    /// Returns a mode queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn mode_queue_capacity_clamped(&self) -> usize {
        self.mode_queue_capacity.max(1)
    }
}

impl Default for RobotConfig {
    /// Default configuration:
    ///
    /// - `tick_period = 20ms` (typical control loop)
    /// - `brake_grace = 5s`
    /// - `command_timeout = 0s` (no timeout)
    /// - `mode_queue_capacity = 16`
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            brake_grace: DEFAULT_BRAKE_GRACE,
            command_timeout: Duration::ZERO,
            mode_queue_capacity: 16,
        }
    }
}
