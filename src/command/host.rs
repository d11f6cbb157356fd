//! # Host command protocol.
//!
//! [`HostCommand`] is the three-phase protocol the [`Scheduler`](crate::Scheduler)
//! drives, plus the declarations it needs for admission:
//!
//! ```text
//! initialize ──► per tick: is_finished(tick)? ──yes──► end(false)
//!                             │ no
//!                             ▼
//!                          execute
//! timeout / preemption / cancel ────────────────────► end(true)
//! ```
//!
//! [`Resource`] names an exclusive resource; two running commands never
//! declare the same one.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

use crate::error::CommandError;

use super::group::CommandGroup;

/// Named exclusive resource (identity by name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resource(Cow<'static, str>);

impl Resource {
    /// Creates a resource handle.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Resource name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Resource {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

/// Three-phase command protocol driven by the [`Scheduler`](crate::Scheduler).
pub trait HostCommand: Send + 'static {
    /// Command name used in logs and failures.
    fn name(&self) -> &str;

    /// Called once, when the command is started.
    fn initialize(&mut self) -> Result<(), CommandError>;

    /// Per-tick work, called only while the command is not finished.
    fn execute(&mut self) -> Result<(), CommandError>;

    /// Reports completion for `tick`.
    ///
    /// May be queried more than once per tick; implementations must not
    /// advance more than once per tick value.
    fn is_finished(&mut self, tick: u64) -> Result<bool, CommandError>;

    /// Called once when the command stops; `interrupted` is false only for natural completion.
    fn end(&mut self, interrupted: bool) -> Result<(), CommandError>;

    /// Exclusive resources held while running.
    fn requirements(&self) -> &[Resource];

    /// Maximum run time (`None` = unbounded).
    fn timeout(&self) -> Option<Duration>;

    /// Whether a newer command requiring the same resource may preempt this one.
    fn is_interruptible(&self) -> bool {
        true
    }
}

impl<H: HostCommand + ?Sized> HostCommand for Box<H> {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn initialize(&mut self) -> Result<(), CommandError> {
        (**self).initialize()
    }
    fn execute(&mut self) -> Result<(), CommandError> {
        (**self).execute()
    }
    fn is_finished(&mut self, tick: u64) -> Result<bool, CommandError> {
        (**self).is_finished(tick)
    }
    fn end(&mut self, interrupted: bool) -> Result<(), CommandError> {
        (**self).end(interrupted)
    }
    fn requirements(&self) -> &[Resource] {
        (**self).requirements()
    }
    fn timeout(&self) -> Option<Duration> {
        (**self).timeout()
    }
    fn is_interruptible(&self) -> bool {
        (**self).is_interruptible()
    }
}

/// Composition combinators for any [`HostCommand`].
pub trait HostCommandExt: HostCommand + Sized {
    /// Runs `self`, then `next` once `self` finished or was ended.
    fn then<N: HostCommand>(self, next: N) -> CommandGroup {
        CommandGroup::sequential().with(self).with(next)
    }

    /// Runs `self` and `other` together; finishes when both did.
    fn and<N: HostCommand>(self, other: N) -> CommandGroup {
        CommandGroup::parallel().with(self).with(other)
    }
}

impl<H: HostCommand> HostCommandExt for H {}
