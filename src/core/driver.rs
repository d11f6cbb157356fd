//! # Driver: async tick loop around a [`Robot`].
//!
//! ```text
//! Driver::run(token)
//!   create() if needed
//!   loop (biased):
//!     token.cancelled()   → exit
//!     mode request (mpsc) → robot.enter(mode)
//!     interval tick       → robot.tick()
//! ```
//!
//! Pending mode requests are applied before the next tick. Errors are logged
//! and never stop the loop; missed ticks are skipped, not bursted.

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::error::RuntimeError;

use super::mode::Mode;
use super::robot::Robot;

/// Drives a robot at its configured tick period.
pub struct Driver {
    robot: Robot,
    requests: mpsc::Receiver<Mode>,
}

impl Driver {
    /// Wraps `robot` and returns the sender for mode requests.
    pub fn new(robot: Robot) -> (Self, mpsc::Sender<Mode>) {
        let (tx, rx) = mpsc::channel(robot.config().mode_queue_capacity_clamped());
        (Self { robot, requests: rx }, tx)
    }

    /// Driven robot.
    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    /// Driven robot, mutable (start commands between runs).
    pub fn robot_mut(&mut self) -> &mut Robot {
        &mut self.robot
    }

    /// Unwraps the robot.
    pub fn into_robot(self) -> Robot {
        self.robot
    }

    /// Runs until `token` is cancelled.
    pub async fn run(&mut self, token: CancellationToken) {
        if !self.robot.is_created() {
            if let Err(e) = self.robot.create() {
                report("create", &e);
            }
        }

        let period = self.robot.config().tick_period_clamped();
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut requests_open = true;
        tracing::info!(period_ms = period.as_millis() as u64, "driver started");

        loop {
            select! {
                biased;
                _ = token.cancelled() => break,
                req = self.requests.recv(), if requests_open => match req {
                    Some(mode) => {
                        if let Err(e) = self.robot.enter(mode) {
                            report("enter", &e);
                        }
                    }
                    None => requests_open = false,
                },
                _ = ticker.tick() => {
                    if let Err(e) = self.robot.tick() {
                        report("tick", &e);
                    }
                }
            }
        }
        tracing::info!(mode = self.robot.mode().as_label(), "driver stopped");
    }
}

fn report(op: &'static str, e: &RuntimeError) {
    tracing::warn!(op, label = e.as_label(), error = %e.as_message(), "robot operation failed");
}
