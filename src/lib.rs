//! # robovisor
//!
//! **Robovisor** is the lifecycle-coordination core of a periodic robot-control
//! framework.
//!
//! It turns the host's coarse notifications (created, tick, enter mode) into
//! ordered lifecycle events delivered to listeners. It also runs simplified
//! commands under a three-phase host protocol with timeouts and exclusive
//! resources, and schedules cancellable deferred actions such as the
//! brake-release safety behavior.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                 ┌──────────────────────────────┐
//!  mode requests ─►           Driver             ◄─ CancellationToken
//!     (mpsc)      │  (interval, biased select!)  │
//!                 └──────────────┬───────────────┘
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Robot                                                            │
//! │  - Scheduler   (initialize / is_finished / execute / end)         │
//! │  - ModeMachine (Disabled / Autonomous / Teleoperated)             │
//! └──────┬──────────────────────────────────────────┬─────────────────┘
//!        │ run() per tick                           │ create / tick / enter
//!        ▼                                          ▼
//!  CommandAdapter<C: Command>            ListenerRegistry (weak, copy-on-write)
//!  CommandGroup (seq / par)                  ┌──────┼──────────┐
//!                                            ▼      ▼          ▼
//!                                      AutoBrake  LogWriter  custom Listen
//!                                            │
//!                                            ▼
//!                                   DeferredSlot ──► DeferredScheduler
//!                                   (release after      (tokio timer task,
//!                                    grace period)       off the tick thread)
//! ```
//!
//! ### Lifecycle
//! ```text
//! create()               ─► OnCreate
//! tick()                 ─► Execute ─► ExecuteDisabled | ExecuteAuto | ExecuteTeleop
//! enter(next != current) ─► [<current stop> ─► OnStop]      (not from the initial Disabled)
//!                           [OnStart ─► <next start>]       (only if next is enabled)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                               |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------------|
//! | **Listener API**  | Hook into lifecycle events.                                   | [`Listen`], [`ListenerRegistry`], [`Event`]      |
//! | **Modes**         | Mode state machine deriving stop/start sequences.             | [`ModeMachine`], [`Mode`]                        |
//! | **Commands**      | Simplified commands on a three-phase host protocol.           | [`Command`], [`CommandAdapter`], [`Scheduler`]   |
//! | **Composition**   | Sequential and parallel command groups.                       | [`CommandGroup`], [`HostCommandExt`]             |
//! | **Deferred**      | Cancellable one-shot delayed actions.                         | [`DeferredScheduler`], [`DeferredHandle`]        |
//! | **Brakes**        | Hold brakes while enabled, release after a grace period.      | [`AutoBrake`], [`BrakeDevice`]                   |
//! | **Runtime**       | Robot facade and async tick loop.                             | [`Robot`], [`Driver`], [`RobotConfig`]           |
//! | **Errors**        | Typed errors with aggregated listener/command failures.       | [`RuntimeError`], [`CommandError`]               |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use robovisor::{
//!     AutoBrake, CommandAdapter, CommandError, CommandFn, DeferredScheduler, Driver, Mode,
//!     Robot, RobotConfig,
//! };
//!
//! // Multi-thread runtime: the brake release fires on a worker, not the tick thread.
//! #[tokio::main(flavor = "multi_thread", worker_threads = 2)]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = RobotConfig::default();
//!     let mut robot = Robot::new(cfg.clone());
//!
//!     // Brake safety listener (kept alive by this Arc)
//!     let brakes = Arc::new(AutoBrake::with_config(DeferredScheduler::try_current()?, &cfg));
//!     robot.registry().register(&brakes);
//!
//!     // A command that finishes after three ticks
//!     let mut left = 3;
//!     robot.scheduler_mut().start(CommandAdapter::new(CommandFn::new("drive", move || {
//!         left -= 1;
//!         Ok::<_, CommandError>(left == 0)
//!     })))?;
//!
//!     let (mut driver, modes) = Driver::new(robot);
//!     modes.send(Mode::Autonomous).await?;
//!
//!     let token = CancellationToken::new();
//!     let stop = token.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(100)).await;
//!         stop.cancel();
//!     });
//!     driver.run(token).await;
//!     assert_eq!(driver.robot().mode(), Mode::Autonomous);
//!     Ok(())
//! }
//! ```
mod brakes;
mod command;
mod core;
mod deferred;
mod error;
mod events;
mod listeners;

// ---- Public re-exports ----

pub use brakes::{AutoBrake, BrakeDevice};
pub use command::{
    Command, CommandAdapter, CommandFn, CommandGroup, CommandId, GroupKind, HostCommand,
    HostCommandExt, Resource, Scheduler,
};
pub use self::core::{
    Driver, Mode, ModeMachine, Robot, RobotConfig, DEFAULT_BRAKE_GRACE, DEFAULT_TICK_PERIOD,
};
pub use deferred::{DeferredHandle, DeferredScheduler, DeferredSlot, DeferredState};
pub use error::{CommandError, CommandFailure, ListenerFailure, RuntimeError};
pub use events::{Event, EventKind, Phase};
pub use listeners::{Listen, ListenerRegistry};

// Optional: expose a simple built-in logger listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listeners::LogWriter;
