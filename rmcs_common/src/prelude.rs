//! Prelude module for common re-exports.
//!
//! ```rust
//! use rmcs_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Control parameters ─────────────────────────────────────────────
pub use crate::control::{ActuatorParams, PidParams};

// ─── Events & modes ─────────────────────────────────────────────────
pub use crate::event::{CmdEvent, EventSet, Keys, SwitchPos};
pub use crate::mode::{
    ChassisAction, ChassisMode, FireMode, GimbalAction, GimbalMode, LauncherAction, ModeAction,
};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CAP_FEEDBACK_TIMEOUT_MS, GAME_CHASSIS_MAX_POWER_WO_REF};
