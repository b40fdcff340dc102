//! Command processing root.
//!
//! Event extraction from the remote control, per-module event maps and the
//! mode holders they drive.

pub mod event_map;
pub mod mode;
pub mod source;
