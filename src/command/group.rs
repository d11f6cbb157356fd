//! # CommandGroup: sequential and parallel composition.
//!
//! A group is itself a [`HostCommand`], so groups nest and go through the
//! same [`Scheduler`](crate::Scheduler) admission as single commands.
//!
//! ```text
//! sequential:  [a] ──finished/ended──► [b] ──► ... ──► finished
//! parallel:    [a] ┐
//!              [b] ┼── all finished/ended ──► finished
//!              [c] ┘
//! ```
//!
//! ## Rules
//! - Children are driven from the group's `is_finished(tick)`: per child,
//!   timed out → `end(true)`; reports finished → `end(false)`; otherwise `execute()`.
//! - A sequential child is initialized on the tick its predecessor ended and
//!   polled from the next tick on.
//! - Requirements are the union of the children's; the group is interruptible
//!   only if every child is.
//! - Ending the group ends every initialized, unfinished child exactly once.
//! - A failing child hook fails the group; the scheduler then ends the group.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::CommandError;

use super::host::{HostCommand, Resource};

/// Composition strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// One child after another.
    Sequential,
    /// All children at once.
    Parallel,
}

impl GroupKind {
    fn as_label(self) -> &'static str {
        match self {
            GroupKind::Sequential => "sequential",
            GroupKind::Parallel => "parallel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildState {
    Idle,
    Running,
    Done,
}

struct Child {
    cmd: Box<dyn HostCommand>,
    timeout: Option<Duration>,
    state: ChildState,
    started_at: Option<Instant>,
}

impl Child {
    fn start(&mut self) -> Result<(), CommandError> {
        self.state = ChildState::Running;
        self.started_at = Some(Instant::now());
        self.cmd.initialize().map_err(|e| self.locate(e))
    }

    /// Prefixes a failure with this child's name; `Canceled` passes through.
    fn locate(&self, e: CommandError) -> CommandError {
        match e {
            CommandError::Fail { error } => CommandError::Fail {
                error: format!("{}: {error}", self.cmd.name()),
            },
            other => other,
        }
    }

    fn timed_out(&self, now: Instant) -> bool {
        match (self.timeout, self.started_at) {
            (Some(limit), Some(started)) => now.duration_since(started) >= limit,
            _ => false,
        }
    }

    /// Drives one tick; returns whether the child is done afterwards.
    fn step(&mut self, tick: u64, now: Instant) -> Result<bool, CommandError> {
        self.drive(tick, now).map_err(|e| self.locate(e))
    }

    fn drive(&mut self, tick: u64, now: Instant) -> Result<bool, CommandError> {
        if self.timed_out(now) {
            tracing::info!(command = self.cmd.name(), "grouped command timed out");
            self.state = ChildState::Done;
            self.cmd.end(true)?;
            return Ok(true);
        }
        if self.cmd.is_finished(tick)? {
            self.state = ChildState::Done;
            self.cmd.end(false)?;
            return Ok(true);
        }
        self.cmd.execute()?;
        Ok(false)
    }
}

/// Sequential or parallel composition of host commands.
pub struct CommandGroup {
    kind: GroupKind,
    name: String,
    children: Vec<Child>,
    requirements: Vec<Resource>,
    timeout: Option<Duration>,
    cursor: usize,
    /// `(tick, finished)` of the last advance.
    last_tick: Option<(u64, bool)>,
}

impl CommandGroup {
    /// Creates an empty sequential group.
    pub fn sequential() -> Self {
        Self::empty(GroupKind::Sequential)
    }

    /// Creates an empty parallel group.
    pub fn parallel() -> Self {
        Self::empty(GroupKind::Parallel)
    }

    fn empty(kind: GroupKind) -> Self {
        let mut group = Self {
            kind,
            name: String::new(),
            children: Vec::new(),
            requirements: Vec::new(),
            timeout: None,
            cursor: 0,
            last_tick: None,
        };
        group.rename();
        group
    }

    /// Adds a child honoring its own timeout.
    pub fn with<H: HostCommand>(self, cmd: H) -> Self {
        let timeout = cmd.timeout();
        self.push(Box::new(cmd), timeout)
    }

    /// Adds a child with a group-local timeout (`Duration::ZERO` = none).
    pub fn with_timed<H: HostCommand>(self, cmd: H, timeout: Duration) -> Self {
        self.push(Box::new(cmd), (timeout > Duration::ZERO).then_some(timeout))
    }

    /// Sets a timeout for the whole group (`Duration::ZERO` = none).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (timeout > Duration::ZERO).then_some(timeout);
        self
    }

    /// Appends `next` to a sequential group, or runs this group then `next`.
    pub fn then<H: HostCommand>(self, next: H) -> CommandGroup {
        match self.kind {
            GroupKind::Sequential => self.with(next),
            GroupKind::Parallel => CommandGroup::sequential().with(self).with(next),
        }
    }

    /// Adds `other` to a parallel group, or runs this group alongside `other`.
    pub fn and<H: HostCommand>(self, other: H) -> CommandGroup {
        match self.kind {
            GroupKind::Parallel => self.with(other),
            GroupKind::Sequential => CommandGroup::parallel().with(self).with(other),
        }
    }

    /// Composition strategy.
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if the group has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn push(mut self, cmd: Box<dyn HostCommand>, timeout: Option<Duration>) -> Self {
        for r in cmd.requirements() {
            if !self.requirements.contains(r) {
                self.requirements.push(r.clone());
            }
        }
        self.children.push(Child {
            cmd,
            timeout,
            state: ChildState::Idle,
            started_at: None,
        });
        self.rename();
        self
    }

    fn rename(&mut self) {
        let names: Vec<&str> = self.children.iter().map(|c| c.cmd.name()).collect();
        self.name = format!("{}[{}]", self.kind.as_label(), names.join(", "));
    }

    /// Drives the children for one tick; returns whether the group finished.
    fn advance(&mut self, tick: u64) -> Result<bool, CommandError> {
        let now = Instant::now();
        match self.kind {
            GroupKind::Parallel => {
                for child in &mut self.children {
                    if child.state == ChildState::Running {
                        child.step(tick, now)?;
                    }
                }
                Ok(self.children.iter().all(|c| c.state == ChildState::Done))
            }
            GroupKind::Sequential => {
                if let Some(child) = self.children.get_mut(self.cursor) {
                    if child.step(tick, now)? {
                        self.cursor += 1;
                        if let Some(next) = self.children.get_mut(self.cursor) {
                            next.start()?;
                        }
                    }
                }
                Ok(self.cursor >= self.children.len())
            }
        }
    }
}

impl HostCommand for CommandGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize(&mut self) -> Result<(), CommandError> {
        self.cursor = 0;
        self.last_tick = None;
        for child in &mut self.children {
            child.state = ChildState::Idle;
            child.started_at = None;
        }
        match self.kind {
            GroupKind::Sequential => match self.children.first_mut() {
                Some(first) => first.start(),
                None => Ok(()),
            },
            GroupKind::Parallel => {
                for child in &mut self.children {
                    child.start()?;
                }
                Ok(())
            }
        }
    }

    fn execute(&mut self) -> Result<(), CommandError> {
        Ok(())
    }

    fn is_finished(&mut self, tick: u64) -> Result<bool, CommandError> {
        if let Some((seen, finished)) = self.last_tick {
            if seen == tick {
                return Ok(finished);
            }
        }
        let finished = self.advance(tick)?;
        self.last_tick = Some((tick, finished));
        Ok(finished)
    }

    fn end(&mut self, interrupted: bool) -> Result<(), CommandError> {
        let mut first_err = None;
        for child in &mut self.children {
            if child.state != ChildState::Running {
                continue;
            }
            child.state = ChildState::Done;
            if let Err(e) = child.cmd.end(interrupted) {
                tracing::warn!(
                    group = %self.name,
                    command = child.cmd.name(),
                    error = %e,
                    "grouped command failed to end"
                );
                first_err.get_or_insert(child.locate(e));
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn requirements(&self) -> &[Resource] {
        &self.requirements
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn is_interruptible(&self) -> bool {
        self.children.iter().all(|c| c.cmd.is_interruptible())
    }
}
