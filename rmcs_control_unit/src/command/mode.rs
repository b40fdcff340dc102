//! Per-module mode holders driven by event maps.
//!
//! Each holder keeps exactly one active mode and reports whether an action
//! changed it, which is what event-map dispatch uses to pick a winner.

use rmcs_common::mode::{
    ChassisAction, ChassisMode, FireMode, GimbalAction, GimbalMode, LauncherAction,
};
use tracing::debug;

use crate::command::event_map::EventHandler;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChassisModeState {
    mode: ChassisMode,
}

impl ChassisModeState {
    #[inline]
    pub const fn mode(&self) -> ChassisMode {
        self.mode
    }
}

impl EventHandler for ChassisModeState {
    type Action = ChassisAction;

    fn handle(&mut self, action: ChassisAction) -> bool {
        let target = action.target();
        if self.mode == target {
            return false;
        }
        debug!(module = "chassis", from = ?self.mode, to = ?target, "mode change");
        self.mode = target;
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GimbalModeState {
    mode: GimbalMode,
}

impl GimbalModeState {
    #[inline]
    pub const fn mode(&self) -> GimbalMode {
        self.mode
    }
}

impl EventHandler for GimbalModeState {
    type Action = GimbalAction;

    fn handle(&mut self, action: GimbalAction) -> bool {
        let target = action.target();
        if self.mode == target {
            return false;
        }
        debug!(module = "gimbal", from = ?self.mode, to = ?target, "mode change");
        self.mode = target;
        true
    }
}

/// Launcher fire mode, cover state and the per-tick fire request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LauncherModeState {
    fire_mode: FireMode,
    cover_open: bool,
    fire: bool,
}

impl LauncherModeState {
    #[inline]
    pub const fn fire_mode(&self) -> FireMode {
        self.fire_mode
    }

    #[inline]
    pub const fn cover_open(&self) -> bool {
        self.cover_open
    }

    /// Take this tick's fire request, clearing it.
    #[inline]
    pub fn take_fire(&mut self) -> bool {
        core::mem::take(&mut self.fire)
    }

    fn set_fire_mode(&mut self, target: FireMode) -> bool {
        if self.fire_mode == target {
            return false;
        }
        debug!(module = "launcher", from = ?self.fire_mode, to = ?target, "fire mode change");
        self.fire_mode = target;
        if target != FireMode::Loaded {
            self.fire = false;
        }
        true
    }
}

impl EventHandler for LauncherModeState {
    type Action = LauncherAction;

    fn handle(&mut self, action: LauncherAction) -> bool {
        match action {
            LauncherAction::ChangeFireModeRelax => self.set_fire_mode(FireMode::Relax),
            LauncherAction::ChangeFireModeSafe => self.set_fire_mode(FireMode::Safe),
            LauncherAction::ChangeFireModeLoaded => self.set_fire_mode(FireMode::Loaded),
            LauncherAction::StartFire => {
                if self.fire_mode != FireMode::Loaded || self.fire {
                    return false;
                }
                self.fire = true;
                true
            }
            LauncherAction::OpenCover => !core::mem::replace(&mut self.cover_open, true),
            LauncherAction::CloseCover => core::mem::replace(&mut self.cover_open, false),
        }
    }
}
