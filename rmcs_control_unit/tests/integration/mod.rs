//! Shared fixtures for the integration scenarios.

mod cap_degrade;
mod config_loading;
mod lost_ctrl;
mod mailbox;
mod pipeline;
mod switch_sequence;

use std::path::PathBuf;
use std::time::Instant;

use rmcs_control_unit::config::{RobotConfig, load_config};
use rmcs_control_unit::cycle::Tick;

/// The configuration shipped with the binary.
pub fn shipped_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../config/robot.toml")
}

pub fn shipped_config() -> RobotConfig {
    load_config(&shipped_config_path()).unwrap()
}

pub fn tick(index: u64, now: Instant, dt: f64) -> Tick {
    Tick { index, now, dt }
}
