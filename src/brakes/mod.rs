//! Brake safety.
//!
//! - [`BrakeDevice`] a device with a switchable brake
//! - [`AutoBrake`] listener engaging brakes while enabled and releasing them
//!   a grace period after the robot stops

mod auto_brake;
mod device;

pub use auto_brake::AutoBrake;
pub use device::BrakeDevice;
