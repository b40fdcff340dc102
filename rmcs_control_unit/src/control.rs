//! Control-law layer root.
//!
//! Biquad filters, PID loops and the actuators built from them. A component
//! is disabled by zeroing its gain or giving a non-positive filter frequency.

pub mod actuator;
pub mod filters;
pub mod pid;
