//! Error types used by the robovisor runtime and commands.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`] errors raised by the lifecycle runtime itself
//!   (state machine entry points, listener broadcast, deferred scheduling).
//! - [`CommandError`] errors raised by commands and the command scheduler.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logs.
//! Failures of individual listeners and commands are carried as
//! [`ListenerFailure`] and [`CommandFailure`] records so a single call can
//! surface every failure that happened during one broadcast or one tick.

use std::fmt;

use thiserror::Error;

use crate::events::EventKind;

/// A listener handler that panicked while handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    /// Event being delivered when the handler failed.
    pub event: EventKind,
    /// Listener name (see [`Listen::name`](crate::Listen::name)).
    pub listener: &'static str,
    /// Panic payload rendered as text.
    pub message: String,
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listener '{}' failed on {}: {}",
            self.listener,
            self.event.as_label(),
            self.message
        )
    }
}

/// A command hook that failed during `start` or a scheduler tick.
#[derive(Debug)]
pub struct CommandFailure {
    /// Name of the failing command.
    pub command: String,
    /// The error returned by the hook.
    pub error: CommandError,
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command '{}': {}", self.command, self.error)
    }
}

/// # Errors produced by the robovisor runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A tick or mode change arrived before the robot was created.
    #[error("robot not created; create() must run before ticks and mode changes")]
    NotCreated,

    /// `create()` was called more than once.
    #[error("robot already created")]
    AlreadyCreated,

    /// One or more listener handlers panicked; every other listener was still notified.
    #[error("{} listener handler(s) failed", failures.len())]
    ListenersFailed {
        /// Failures in delivery order.
        failures: Vec<ListenerFailure>,
    },

    /// A full robot tick saw listener and/or command failures.
    #[error(
        "tick failed: {} listener failure(s), {} command failure(s)",
        listeners.len(),
        commands.len()
    )]
    TickFailed {
        /// Listener failures of the lifecycle tick.
        listeners: Vec<ListenerFailure>,
        /// Command failures of the scheduler run.
        commands: Vec<CommandFailure>,
    },

    /// Deferred scheduling requested outside of a tokio runtime.
    #[error("no tokio runtime available for deferred actions")]
    NoRuntime,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use robovisor::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::NotCreated.as_label(), "runtime_not_created");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NotCreated => "runtime_not_created",
            RuntimeError::AlreadyCreated => "runtime_already_created",
            RuntimeError::ListenersFailed { .. } => "runtime_listeners_failed",
            RuntimeError::TickFailed { .. } => "runtime_tick_failed",
            RuntimeError::NoRuntime => "runtime_no_tokio",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::ListenersFailed { failures } => {
                let parts: Vec<String> = failures.iter().map(ToString::to_string).collect();
                format!("listeners failed: [{}]", parts.join("; "))
            }
            RuntimeError::TickFailed { listeners, commands } => {
                let mut parts: Vec<String> = listeners.iter().map(ToString::to_string).collect();
                parts.extend(commands.iter().map(ToString::to_string));
                format!("tick failed: [{}]", parts.join("; "))
            }
            other => other.to_string(),
        }
    }

    /// Listener failures carried by this error, if any.
    pub fn listener_failures(&self) -> &[ListenerFailure] {
        match self {
            RuntimeError::ListenersFailed { failures } => failures,
            RuntimeError::TickFailed { listeners, .. } => listeners,
            _ => &[],
        }
    }
}

/// # Errors produced by commands.
///
/// Hooks return [`CommandError::Fail`] for genuine failures. A hook may return
/// [`CommandError::Canceled`] to stop the command gracefully; the scheduler
/// ends it as interrupted and does not report a failure.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// A command hook failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The command asked to be stopped.
    #[error("command cancelled")]
    Canceled,

    /// A required resource is held by a command that cannot be interrupted.
    #[error("resource '{resource}' is held by non-interruptible command '{holder}'")]
    RequirementConflict {
        /// The contested resource.
        resource: String,
        /// Name of the command holding it.
        holder: String,
    },

    /// One or more commands failed during a scheduler run.
    #[error("{} command(s) failed", failures.len())]
    Failed {
        /// Failures in scheduling order.
        failures: Vec<CommandFailure>,
    },
}

impl CommandError {
    /// Shorthand for [`CommandError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        CommandError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use robovisor::CommandError;
    ///
    /// assert_eq!(CommandError::fail("boom").as_label(), "command_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CommandError::Fail { .. } => "command_failed",
            CommandError::Canceled => "command_canceled",
            CommandError::RequirementConflict { .. } => "command_requirement_conflict",
            CommandError::Failed { .. } => "command_run_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CommandError::Fail { error } => format!("error: {error}"),
            CommandError::Canceled => "command cancelled".to_string(),
            CommandError::RequirementConflict { resource, holder } => {
                format!("conflict: resource={resource} holder={holder}")
            }
            CommandError::Failed { failures } => {
                let parts: Vec<String> = failures.iter().map(ToString::to_string).collect();
                format!("failed: [{}]", parts.join("; "))
            }
        }
    }

    /// Whether the error is a real failure (everything except [`CommandError::Canceled`]).
    ///
    /// # Example
    /// ```
    /// use robovisor::CommandError;
    ///
    /// assert!(CommandError::fail("boom").is_failure());
    /// assert!(!CommandError::Canceled.is_failure());
    /// ```
    pub fn is_failure(&self) -> bool {
        !matches!(self, CommandError::Canceled)
    }

    /// Failures carried by [`CommandError::Failed`], empty otherwise.
    pub fn failures(&self) -> &[CommandFailure] {
        match self {
            CommandError::Failed { failures } => failures,
            _ => &[],
        }
    }
}
