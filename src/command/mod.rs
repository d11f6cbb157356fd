//! Commands: the user contract, the host protocol and the scheduler.
//!
//! ## Contents
//! - [`Command`] / [`CommandFn`] the simplified 2-phase contract (create, poll, destroy)
//! - [`HostCommand`] / [`Resource`] the host's 3-phase protocol and exclusive resources
//! - [`CommandAdapter`] bridges the two
//! - [`CommandGroup`] / [`HostCommandExt`] sequential and parallel composition
//! - [`Scheduler`] / [`CommandId`] runs host commands once per tick
//!
//! ## Flow
//! ```text
//! Command ──► CommandAdapter ──┐
//!                              ├──► Scheduler::start ──► run() per tick
//! CommandGroup(children) ──────┘
//! ```

mod adapter;
mod contract;
mod group;
mod host;
mod scheduler;

pub use adapter::CommandAdapter;
pub use contract::{Command, CommandFn};
pub use group::{CommandGroup, GroupKind};
pub use host::{HostCommand, HostCommandExt, Resource};
pub use scheduler::{CommandId, Scheduler};
