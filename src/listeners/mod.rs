//! # Lifecycle listeners and their registry.
//!
//! This module provides the [`Listen`] trait and the [`ListenerRegistry`]
//! that fans lifecycle events out to every registered listener.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   ModeMachine ── broadcast(kind) ──► ListenerRegistry ──► Listen::on_event(&Event)
//!                                              │
//!                                    ┌─────────┼──────────┬─────────┐
//!                                    ▼         ▼          ▼         ▼
//!                                AutoBrake  LogWriter  Custom      ...
//! ```
//!
//! ## Listener types
//! - **Passive listeners** observe and react to events (logging, dashboards)
//! - **Stateful listeners** keep state driven by events (`AutoBrake`)

#[cfg(feature = "logging")]
mod log;
mod listener;
mod registry;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use listener::Listen;
pub use registry::ListenerRegistry;
