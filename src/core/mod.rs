//! Runtime core: modes, state machine and the robot facade.
//!
//! - [`config`]: [`RobotConfig`] and default constants;
//! - [`mode`]: the three operating modes;
//! - [`machine`]: mode state machine emitting lifecycle sequences;
//! - [`robot`]: facade tying the machine to the command scheduler;
//! - [`driver`]: async tick loop with mode requests.

mod config;
mod driver;
mod machine;
mod mode;
mod robot;

pub use config::{RobotConfig, DEFAULT_BRAKE_GRACE, DEFAULT_TICK_PERIOD};
pub use driver::Driver;
pub use machine::ModeMachine;
pub use mode::Mode;
pub use robot::Robot;
