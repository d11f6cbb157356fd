//! # Simple logging listener for debugging and demos.
//!
//! [`LogWriter`] traces every lifecycle event through `tracing`.
//! Boundary events are logged at `info`, tick events at `trace` (they arrive
//! every 20 ms or so and would drown everything else).
//!
//! ## Output format
//! ```text
//! INFO robovisor: lifecycle event=on_start seq=3
//! INFO robovisor: lifecycle event=on_auto_start seq=4
//! TRACE robovisor: lifecycle tick event=execute_auto seq=6
//! ```

use crate::events::{Event, Phase};
use crate::listeners::Listen;

/// Tracing-backed lifecycle logger.
///
/// Enabled via the `logging` feature. Register it like any other listener;
/// keep the `Arc` alive for as long as logging is wanted.
#[derive(Debug, Default)]
pub struct LogWriter;

impl LogWriter {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self
    }
}

impl Listen for LogWriter {
    fn on_event(&self, e: &Event) {
        match e.phase() {
            Phase::Tick => {
                tracing::trace!(event = e.kind.as_label(), seq = e.seq, "lifecycle tick");
            }
            Phase::Creation | Phase::EnableBoundary | Phase::DisableBoundary => {
                tracing::info!(event = e.kind.as_label(), seq = e.seq, "lifecycle");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
