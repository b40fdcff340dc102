//! Module modes and event-map actions.
//!
//! Each module has exactly one active mode (mutually exclusive enum) and a
//! set of actions an event map may trigger. Every action enum can say which
//! of its variants forces the module into its safest mode; event-map
//! validation uses that to enforce the loss-of-control invariant.
//!
//! All enums use `#[repr(u8)]` so they pack into UI summaries unchanged.

use serde::{Deserialize, Serialize};

/// Implemented by every event-map action enum.
pub trait ModeAction: Copy + core::fmt::Debug + PartialEq {
    /// True if this action puts its module into Relax.
    fn is_relax(&self) -> bool;
}

// ─── Chassis ────────────────────────────────────────────────────────

/// Chassis operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ChassisMode {
    /// Motors unpowered (safe).
    #[default]
    Relax = 0,
    /// Wheels held at zero speed.
    Break = 1,
    /// Translate freely; rotation follows the gimbal heading.
    FollowGimbal = 2,
    /// Spin continuously while translating.
    Rotor = 3,
    /// Translate and rotate from stick input only.
    Independent = 4,
}

/// Chassis event-map actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChassisAction {
    SetModeRelax,
    SetModeBreak,
    SetModeFollowGimbal,
    SetModeRotor,
    SetModeIndependent,
}

impl ChassisAction {
    /// Mode this action selects.
    pub const fn target(self) -> ChassisMode {
        match self {
            Self::SetModeRelax => ChassisMode::Relax,
            Self::SetModeBreak => ChassisMode::Break,
            Self::SetModeFollowGimbal => ChassisMode::FollowGimbal,
            Self::SetModeRotor => ChassisMode::Rotor,
            Self::SetModeIndependent => ChassisMode::Independent,
        }
    }
}

impl ModeAction for ChassisAction {
    fn is_relax(&self) -> bool {
        matches!(self, Self::SetModeRelax)
    }
}

// ─── Gimbal ─────────────────────────────────────────────────────────

/// Gimbal operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum GimbalMode {
    /// Motors unpowered (safe).
    #[default]
    Relax = 0,
    /// Closed loop on IMU attitude (world frame).
    Absolute = 1,
    /// Closed loop on motor encoders (chassis frame).
    Relative = 2,
}

/// Gimbal event-map actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GimbalAction {
    SetModeRelax,
    SetModeAbsolute,
    SetModeRelative,
}

impl GimbalAction {
    /// Mode this action selects.
    pub const fn target(self) -> GimbalMode {
        match self {
            Self::SetModeRelax => GimbalMode::Relax,
            Self::SetModeAbsolute => GimbalMode::Absolute,
            Self::SetModeRelative => GimbalMode::Relative,
        }
    }
}

impl ModeAction for GimbalAction {
    fn is_relax(&self) -> bool {
        matches!(self, Self::SetModeRelax)
    }
}

// ─── Launcher ───────────────────────────────────────────────────────

/// Launcher fire mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FireMode {
    /// Friction wheels and trigger unpowered (safe).
    #[default]
    Relax = 0,
    /// Powered but friction wheels stopped; no shots.
    Safe = 1,
    /// Friction wheels at speed; shots allowed.
    Loaded = 2,
}

/// Launcher event-map actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LauncherAction {
    ChangeFireModeRelax,
    ChangeFireModeSafe,
    ChangeFireModeLoaded,
    /// Request a shot (only honoured while `Loaded`).
    StartFire,
    OpenCover,
    CloseCover,
}

impl ModeAction for LauncherAction {
    fn is_relax(&self) -> bool {
        matches!(self, Self::ChangeFireModeRelax)
    }
}
