//! # Scheduler: the host's three-phase command executor.
//!
//! Runs [`HostCommand`]s once per tick, enforcing timeouts and exclusive
//! resource requirements.
//!
//! ## Per tick (`run`)
//! ```text
//! for each running command, in start order:
//!   timed out            → end(true)    (logged, not a failure)
//!   is_finished(tick)?   → end(false)
//!   otherwise            → execute()
//!   hook error           → end(true), failure recorded
//! ```
//!
//! ## Admission (`start`)
//! ```text
//! requirement held by non-interruptible command → Err(RequirementConflict)
//! requirement held by interruptible commands    → holders end(true), then start
//! initialize() fails                            → end(true), Err returned
//! ```
//!
//! ## Rules
//! - `initialize` runs inside `start`; the first `is_finished` comes with the next `run`.
//! - Every started command is ended exactly once (finish, timeout, cancel,
//!   preemption or hook failure).
//! - A hook returning [`CommandError::Canceled`] ends the command as
//!   interrupted without reporting a failure.
//! - Failures raised outside `run` (preemption, `cancel`) are reported by the next `run`.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{CommandError, CommandFailure};

use super::host::HostCommand;

/// Identifier of a started command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(u64);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd#{}", self.0)
    }
}

struct Running {
    id: CommandId,
    cmd: Box<dyn HostCommand>,
    started_at: Instant,
    timeout: Option<Duration>,
}

impl Running {
    fn timed_out(&self, now: Instant) -> bool {
        self.timeout
            .is_some_and(|limit| now.duration_since(self.started_at) >= limit)
    }

    /// `Some(interrupted)` once the command must be ended.
    fn step(&mut self, tick: u64, now: Instant) -> Result<Option<bool>, CommandError> {
        if self.timed_out(now) {
            tracing::info!(id = %self.id, command = self.cmd.name(), "command timed out");
            return Ok(Some(true));
        }
        if self.cmd.is_finished(tick)? {
            return Ok(Some(false));
        }
        self.cmd.execute()?;
        Ok(None)
    }
}

/// Host command scheduler.
#[derive(Default)]
pub struct Scheduler {
    running: Vec<Running>,
    next_id: u64,
    tick: u64,
    /// Failures raised between runs, reported by the next run.
    carried: Vec<CommandFailure>,
}

impl Scheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `cmd`, preempting interruptible holders of its requirements.
    pub fn start<H: HostCommand>(&mut self, cmd: H) -> Result<CommandId, CommandError> {
        self.start_boxed(Box::new(cmd))
    }

    /// Same as [`start`](Self::start) for an already boxed command.
    pub fn start_boxed(
        &mut self,
        mut cmd: Box<dyn HostCommand>,
    ) -> Result<CommandId, CommandError> {
        let conflicting: Vec<usize> = self
            .running
            .iter()
            .enumerate()
            .filter(|(_, r)| {
                r.cmd
                    .requirements()
                    .iter()
                    .any(|held| cmd.requirements().contains(held))
            })
            .map(|(i, _)| i)
            .collect();

        for &i in &conflicting {
            let holder = &self.running[i].cmd;
            if !holder.is_interruptible() {
                let resource = holder
                    .requirements()
                    .iter()
                    .find(|held| cmd.requirements().contains(held))
                    .map(ToString::to_string)
                    .unwrap_or_default();
                return Err(CommandError::RequirementConflict {
                    resource,
                    holder: holder.name().to_string(),
                });
            }
        }

        for &i in conflicting.iter().rev() {
            let mut holder = self.running.remove(i);
            tracing::debug!(
                id = %holder.id,
                command = holder.cmd.name(),
                by = cmd.name(),
                "command preempted"
            );
            if let Err(e) = holder.cmd.end(true) {
                self.carry(holder.cmd.name(), e);
            }
        }

        self.next_id += 1;
        let id = CommandId(self.next_id);

        if let Err(e) = cmd.initialize() {
            if let Err(end_err) = cmd.end(true) {
                tracing::warn!(
                    command = cmd.name(),
                    error = %end_err,
                    "end after failed initialize also failed"
                );
            }
            return Err(e);
        }

        tracing::debug!(%id, command = cmd.name(), "command started");
        let timeout = cmd.timeout();
        self.running.push(Running {
            id,
            cmd,
            started_at: Instant::now(),
            timeout,
        });
        Ok(id)
    }

    /// Ends the command as interrupted. Returns `false` if it is not running.
    pub fn cancel(&mut self, id: CommandId) -> bool {
        let Some(pos) = self.running.iter().position(|r| r.id == id) else {
            return false;
        };
        let mut entry = self.running.remove(pos);
        tracing::debug!(%id, command = entry.cmd.name(), "command cancelled");
        if let Err(e) = entry.cmd.end(true) {
            self.carry(entry.cmd.name(), e);
        }
        true
    }

    /// Cancels every running command, in start order.
    pub fn cancel_all(&mut self) {
        for mut entry in std::mem::take(&mut self.running) {
            if let Err(e) = entry.cmd.end(true) {
                self.carry(entry.cmd.name(), e);
            }
        }
    }

    /// Runs one tick. Failures are aggregated into [`CommandError::Failed`].
    pub fn run(&mut self) -> Result<(), CommandError> {
        let failures = self.run_collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(CommandError::Failed { failures })
        }
    }

    /// Runs one tick and returns the raw failures (used by `Robot::tick`).
    pub(crate) fn run_collect(&mut self) -> Vec<CommandFailure> {
        self.tick += 1;
        let tick = self.tick;
        let now = Instant::now();
        let mut failures = std::mem::take(&mut self.carried);

        let mut keep = Vec::with_capacity(self.running.len());
        for mut entry in std::mem::take(&mut self.running) {
            let end = match entry.step(tick, now) {
                Ok(None) => {
                    keep.push(entry);
                    continue;
                }
                Ok(Some(interrupted)) => entry.cmd.end(interrupted),
                Err(e) => {
                    if e.is_failure() {
                        tracing::warn!(
                            id = %entry.id,
                            command = entry.cmd.name(),
                            error = %e,
                            "command failed"
                        );
                        failures.push(failure(entry.cmd.name(), e));
                    }
                    entry.cmd.end(true)
                }
            };
            if let Err(e) = end {
                if e.is_failure() {
                    failures.push(failure(entry.cmd.name(), e));
                }
            }
            tracing::trace!(id = %entry.id, command = entry.cmd.name(), "command ended");
        }
        self.running = keep;
        failures
    }

    /// True while the command has not ended.
    pub fn is_running(&self, id: CommandId) -> bool {
        self.running.iter().any(|r| r.id == id)
    }

    /// Number of running commands.
    pub fn len(&self) -> usize {
        self.running.len()
    }

    /// True if nothing is running.
    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Names of running commands, in start order.
    pub fn names(&self) -> Vec<String> {
        self.running.iter().map(|r| r.cmd.name().to_string()).collect()
    }

    /// Number of completed runs.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    fn carry(&mut self, command: &str, error: CommandError) {
        if error.is_failure() {
            tracing::warn!(command, error = %error, "command failed to end");
            self.carried.push(failure(command, error));
        }
    }
}

fn failure(command: &str, error: CommandError) -> CommandFailure {
    CommandFailure {
        command: command.to_string(),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandAdapter, CommandFn};

    type PollFn = fn() -> Result<bool, CommandError>;

    fn never() -> Result<bool, CommandError> {
        Ok(false)
    }

    fn forever(name: &'static str) -> CommandAdapter<CommandFn<PollFn>> {
        CommandAdapter::new(CommandFn::new(name, never as PollFn))
    }

    #[test]
    fn test_finishes_and_leaves() {
        let mut s = Scheduler::new();
        let mut polls = 0;
        let id = s
            .start(CommandAdapter::new(CommandFn::new("two", move || {
                polls += 1;
                Ok(polls == 2)
            })))
            .unwrap();
        s.run().unwrap();
        assert!(s.is_running(id));
        s.run().unwrap();
        assert!(!s.is_running(id));
        assert!(s.is_empty());
        assert_eq!(s.tick(), 2);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut s = Scheduler::new();
        let id = s.start(forever("idle")).unwrap();
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        s.run().unwrap();
    }

    #[test]
    fn test_conflict_preempts_interruptible() {
        let mut s = Scheduler::new();
        let old = s.start(forever("old").requires("drive")).unwrap();
        let other = s.start(forever("other").requires("arm")).unwrap();
        let new = s.start(forever("new").requires("drive")).unwrap();
        assert!(!s.is_running(old));
        assert!(s.is_running(other));
        assert!(s.is_running(new));
        assert_eq!(s.names(), vec!["other".to_string(), "new".to_string()]);
    }

    #[test]
    fn test_conflict_rejected_by_non_interruptible() {
        let mut s = Scheduler::new();
        let held = s
            .start(forever("held").requires("drive").non_interruptible())
            .unwrap();
        let err = s.start(forever("late").requires("drive")).unwrap_err();
        match err {
            CommandError::RequirementConflict { resource, holder } => {
                assert_eq!(resource, "drive");
                assert_eq!(holder, "held");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(s.is_running(held));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_hook_failure_reported_and_command_ended() {
        let mut s = Scheduler::new();
        let bad = s
            .start(CommandAdapter::new(CommandFn::new("bad", || {
                Err::<bool, _>(CommandError::fail("sensor unplugged"))
            })))
            .unwrap();
        let good = s.start(forever("good")).unwrap();

        let err = s.run().unwrap_err();
        assert_eq!(err.failures().len(), 1);
        assert_eq!(err.failures()[0].command, "bad");
        assert!(!s.is_running(bad));
        assert!(s.is_running(good));
    }

    #[test]
    fn test_canceled_from_hook_is_not_a_failure() {
        let mut s = Scheduler::new();
        let id = s
            .start(CommandAdapter::new(CommandFn::new("quit", || {
                Err::<bool, _>(CommandError::Canceled)
            })))
            .unwrap();
        s.run().unwrap();
        assert!(!s.is_running(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_ends_command() {
        let mut s = Scheduler::new();
        let id = s
            .start(forever("slow").with_timeout(Duration::from_millis(100)))
            .unwrap();
        s.run().unwrap();
        tokio::time::advance(Duration::from_millis(150)).await;
        s.run().unwrap();
        assert!(!s.is_running(id));
    }
}
