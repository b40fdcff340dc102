//! # RMCS Control Unit Library
//!
//! Real-time control core for a chassis / gimbal / launcher / super-capacitor
//! robot. Fixed-period tasks exchange latest-value state through single-slot
//! mailboxes; every module degrades to a safe state when its input goes
//! quiet.
//!
//! ## Layers
//!
//! 1. **control**: biquad filters, PID loops, speed and cascade actuators
//! 2. **module**: capacitor, chassis, gimbal and launcher control laws
//! 3. **command**: remote-control events and per-module event maps
//! 4. **mailbox / runtime / cycle / task**: the concurrent pipeline
//!
//! Nothing on the control path allocates or returns `Err`: configuration
//! faults are rejected at construction, runtime faults become state.

#![deny(clippy::disallowed_types)]

pub mod command;
pub mod config;
pub mod control;
pub mod cycle;
pub mod error;
pub mod mailbox;
pub mod module;
pub mod runtime;
pub mod sim;
pub mod task;
