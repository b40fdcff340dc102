//! Per-subsystem control loops.
//!
//! Each module is a plain struct stepped once per task tick: inputs in,
//! output struct out. Modules never touch mailboxes; the tasks in
//! [`crate::task`] do the I/O around them.

pub mod cap;
pub mod chassis;
pub mod gimbal;
pub mod launcher;

use core::f64::consts::TAU;

/// Motor speed in rpm to rad/s.
#[inline]
pub fn rpm_to_rad_s(rpm: f64) -> f64 {
    rpm * TAU / 60.0
}
