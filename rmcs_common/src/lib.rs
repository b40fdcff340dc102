//! RMCS Common Library
//!
//! Shared constants, configuration loading, mode/event definitions and
//! mailbox payloads for all RMCS workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Task rates, timeouts and fail-safe ceilings
//! - [`config`] - Configuration loading trait and shared config section
//! - [`control`] - PID and actuator parameter tables
//! - [`event`] - Discrete command events and event sets
//! - [`mode`] - Per-module modes and event-map actions
//! - [`msg`] - Feedback, command, telemetry, output and UI payloads
//! - [`prelude`] - Common re-exports for convenience

pub mod config;
pub mod consts;
pub mod control;
pub mod event;
pub mod mode;
pub mod msg;
pub mod prelude;
