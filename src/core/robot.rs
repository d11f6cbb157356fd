//! # Robot: lifecycle facade over the registry, mode machine and command scheduler.
//!
//! ```text
//! Robot::tick()
//!   ├─► Scheduler::run()       (commands: finish / timeout / execute)
//!   └─► ModeMachine::tick()    (Execute, Execute<Mode>)
//! ```
//!
//! Both halves always run; their failures are merged into one
//! [`RuntimeError::TickFailed`].

use std::sync::Arc;

use crate::command::Scheduler;
use crate::error::RuntimeError;
use crate::listeners::ListenerRegistry;

use super::config::RobotConfig;
use super::machine::ModeMachine;
use super::mode::Mode;

/// One robot instance.
pub struct Robot {
    config: RobotConfig,
    machine: ModeMachine,
    scheduler: Scheduler,
}

impl Robot {
    /// Creates a robot with its own listener registry.
    pub fn new(config: RobotConfig) -> Self {
        Self::with_registry(config, Arc::new(ListenerRegistry::new()))
    }

    /// Creates a robot broadcasting to `registry`.
    pub fn with_registry(config: RobotConfig, registry: Arc<ListenerRegistry>) -> Self {
        Self {
            config,
            machine: ModeMachine::new(registry),
            scheduler: Scheduler::new(),
        }
    }

    /// Runtime configuration.
    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// Registry lifecycle events are broadcast to.
    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        self.machine.registry()
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.machine.mode()
    }

    /// True once `create` ran.
    pub fn is_created(&self) -> bool {
        self.machine.is_created()
    }

    /// Command scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Command scheduler, for starting and cancelling commands.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// Emits `OnCreate`; see [`ModeMachine::create`].
    pub fn create(&mut self) -> Result<(), RuntimeError> {
        self.machine.create()
    }

    /// Switches mode; see [`ModeMachine::enter`].
    pub fn enter(&mut self, mode: Mode) -> Result<(), RuntimeError> {
        self.machine.enter(mode)
    }

    /// Runs the command scheduler, then the lifecycle tick.
    pub fn tick(&mut self) -> Result<(), RuntimeError> {
        if !self.machine.is_created() {
            return Err(RuntimeError::NotCreated);
        }
        let commands = self.scheduler.run_collect();
        let listeners = self.machine.tick_failures()?;
        if commands.is_empty() && listeners.is_empty() {
            Ok(())
        } else {
            Err(RuntimeError::TickFailed {
                listeners,
                commands,
            })
        }
    }
}
