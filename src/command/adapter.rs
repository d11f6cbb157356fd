//! # CommandAdapter: bridges a [`Command`] onto the [`HostCommand`] protocol.
//!
//! ## Mapping
//! ```text
//! HostCommand           Command
//! ───────────────────   ─────────────────────────────────────────
//! initialize()      ──► on_create()
//! execute()         ──► (no-op)
//! is_finished(tick) ──► poll(), at most once per tick (memoized)
//! end(_)            ──► on_destroy(), exactly once
//! requirements()    ◄── requires(resource)
//! timeout()         ◄── with_timeout(d) / with_defaults(cmd, &config)
//! ```
//!
//! All decision logic lives in `is_finished`, so a single `poll` per tick
//! both does the work and reports completion.

use std::time::Duration;

use crate::core::RobotConfig;
use crate::error::CommandError;

use super::contract::Command;
use super::host::{HostCommand, Resource};

/// Adapts a [`Command`] to the host protocol.
pub struct CommandAdapter<C> {
    inner: C,
    requirements: Vec<Resource>,
    timeout: Option<Duration>,
    interruptible: bool,
    /// `(tick, finished)` of the last poll.
    last_poll: Option<(u64, bool)>,
    created: bool,
    destroyed: bool,
}

impl<C: Command> CommandAdapter<C> {
    /// Wraps `inner` with no timeout and no requirements.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            requirements: Vec::new(),
            timeout: None,
            interruptible: true,
            last_poll: None,
            created: false,
            destroyed: false,
        }
    }

    /// Wraps `inner` with the configured default timeout.
    pub fn with_defaults(inner: C, config: &RobotConfig) -> Self {
        let mut adapter = Self::new(inner);
        adapter.timeout = config.default_command_timeout();
        adapter
    }

    /// Declares an exclusive resource. Declaring the same resource twice is a no-op.
    pub fn requires(mut self, resource: impl Into<Resource>) -> Self {
        let resource = resource.into();
        if !self.requirements.contains(&resource) {
            self.requirements.push(resource);
        }
        self
    }

    /// Sets the timeout; `Duration::ZERO` means no timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (timeout > Duration::ZERO).then_some(timeout);
        self
    }

    /// Prevents preemption by newer commands sharing a requirement.
    pub fn non_interruptible(mut self) -> Self {
        self.interruptible = false;
        self
    }

    /// Wrapped command.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwraps the command.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: Command> HostCommand for CommandAdapter<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn initialize(&mut self) -> Result<(), CommandError> {
        self.created = true;
        self.destroyed = false;
        self.last_poll = None;
        self.inner.on_create()
    }

    fn execute(&mut self) -> Result<(), CommandError> {
        Ok(())
    }

    fn is_finished(&mut self, tick: u64) -> Result<bool, CommandError> {
        match self.last_poll {
            Some((seen, finished)) if seen == tick => Ok(finished),
            _ => {
                let finished = self.inner.poll()?;
                self.last_poll = Some((tick, finished));
                Ok(finished)
            }
        }
    }

    fn end(&mut self, interrupted: bool) -> Result<(), CommandError> {
        if !self.created || self.destroyed {
            return Ok(());
        }
        self.destroyed = true;
        tracing::trace!(command = self.inner.name(), interrupted, "command destroyed");
        self.inner.on_destroy()
    }

    fn requirements(&self) -> &[Resource] {
        &self.requirements
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn is_interruptible(&self) -> bool {
        self.interruptible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Hooks {
        creates: u32,
        polls: u32,
        destroys: u32,
        finish_after: u32,
    }

    impl Command for Hooks {
        fn name(&self) -> &str {
            "hooks"
        }
        fn on_create(&mut self) -> Result<(), CommandError> {
            self.creates += 1;
            Ok(())
        }
        fn poll(&mut self) -> Result<bool, CommandError> {
            self.polls += 1;
            Ok(self.polls >= self.finish_after)
        }
        fn on_destroy(&mut self) -> Result<(), CommandError> {
            self.destroys += 1;
            Ok(())
        }
    }

    #[test]
    fn test_poll_memoized_per_tick() {
        let mut a = CommandAdapter::new(Hooks {
            finish_after: 2,
            ..Hooks::default()
        });
        a.initialize().unwrap();
        assert!(!a.is_finished(1).unwrap());
        assert!(!a.is_finished(1).unwrap());
        assert_eq!(a.inner().polls, 1);
        assert!(a.is_finished(2).unwrap());
        assert_eq!(a.inner().polls, 2);
    }

    #[test]
    fn test_destroy_exactly_once() {
        let mut a = CommandAdapter::new(Hooks::default());
        a.end(true).unwrap();
        assert_eq!(a.inner().destroys, 0, "never created, nothing to destroy");

        a.initialize().unwrap();
        a.end(true).unwrap();
        a.end(false).unwrap();
        assert_eq!(a.inner().creates, 1);
        assert_eq!(a.inner().destroys, 1);
    }

    #[test]
    fn test_declarations() {
        let config = RobotConfig {
            command_timeout: Duration::from_secs(2),
            ..RobotConfig::default()
        };
        let a = CommandAdapter::with_defaults(Hooks::default(), &config)
            .requires("arm")
            .requires("arm")
            .requires(Resource::new("intake"));
        assert_eq!(a.timeout(), Some(Duration::from_secs(2)));
        assert_eq!(a.requirements(), &[Resource::new("arm"), Resource::new("intake")]);
        assert!(a.is_interruptible());

        let a = a.with_timeout(Duration::ZERO).non_interruptible();
        assert_eq!(a.timeout(), None);
        assert!(!a.is_interruptible());
    }
}
