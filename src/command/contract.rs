//! # User command contract (`Command`) and closure-backed command (`CommandFn`).
//!
//! A [`Command`] is the simplified, 2-phase contract application code writes:
//!
//! ```text
//! on_create() ──► poll() → false ──► poll() → false ──► poll() → true ──► on_destroy()
//!                 (once per tick, until finished or ended by the host)
//! ```
//!
//! Wrap it in a [`CommandAdapter`](crate::CommandAdapter) to hand it to the
//! [`Scheduler`](crate::Scheduler). Timeout and resource requirements are
//! declared on the adapter, not here.
//!
//! ## Example
//! ```rust
//! use robovisor::{CommandAdapter, CommandError, CommandFn, Resource, Scheduler};
//!
//! let mut remaining = 3;
//! let cmd = CommandFn::new("count-down", move || {
//!     remaining -= 1;
//!     Ok::<_, CommandError>(remaining == 0)
//! });
//!
//! let mut scheduler = Scheduler::new();
//! let id = scheduler
//!     .start(CommandAdapter::new(cmd).requires(Resource::new("drive")))
//!     .unwrap();
//! for _ in 0..3 {
//!     scheduler.run().unwrap();
//! }
//! assert!(!scheduler.is_running(id));
//! ```

use std::borrow::Cow;

use crate::error::CommandError;

/// Simplified command contract.
///
/// ### Implementation requirements
/// - `poll` is called at most once per tick and must not block.
/// - Returning [`CommandError::Canceled`] from any hook stops the command
///   gracefully (it is ended as interrupted, no failure is reported).
pub trait Command: Send + 'static {
    /// Returns a stable, human-readable command name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once when the command is started.
    fn on_create(&mut self) -> Result<(), CommandError> {
        Ok(())
    }

    /// Does one tick of work and reports whether the command is finished.
    fn poll(&mut self) -> Result<bool, CommandError>;

    /// Called exactly once when the command ends, whatever the reason.
    fn on_destroy(&mut self) -> Result<(), CommandError> {
        Ok(())
    }
}

/// Function-backed command.
///
/// Wraps a closure used as the `poll` hook; `on_create`/`on_destroy` are no-ops.
pub struct CommandFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> CommandFn<F> {
    /// Creates a new function-backed command.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Command for CommandFn<F>
where
    F: FnMut() -> Result<bool, CommandError> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn poll(&mut self) -> Result<bool, CommandError> {
        (self.f)()
    }
}

impl<F> std::fmt::Debug for CommandFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandFn").field("name", &self.name).finish()
    }
}
