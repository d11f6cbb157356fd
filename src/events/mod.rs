//! Lifecycle events: types and phases.
//!
//! This module groups the event **data model** delivered to listeners by the
//! [`ListenerRegistry`](crate::ListenerRegistry).
//!
//! ## Contents
//! - [`EventKind`] the twelve lifecycle events
//! - [`Phase`] which boundary (or tick) an event belongs to
//! - [`Event`] kind plus ordering metadata
//!
//! ## Quick reference
//! - **Publisher**: `ModeMachine` (create, transitions, ticks).
//! - **Consumers**: any [`Listen`](crate::Listen) implementation registered
//!   with the registry (including `AutoBrake`).

mod event;

pub use event::{Event, EventKind, Phase};
