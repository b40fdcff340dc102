//! Discrete command events.
//!
//! [`CmdEvent`] names one event for configuration (event maps are written in
//! TOML with these names). [`EventSet`] is the per-tick set of active events:
//! one bit per `CmdEvent`, bit index equal to the enum discriminant.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// One discrete input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CmdEvent {
    /// Remote control lost (global fail-safe).
    LostCtrl = 0,
    /// Left switch in top position (level).
    SwLPosTop = 1,
    /// Left switch in middle position (level).
    SwLPosMid = 2,
    /// Left switch in bottom position (level).
    SwLPosBot = 3,
    /// Right switch in top position (level).
    SwRPosTop = 4,
    /// Right switch in middle position (level).
    SwRPosMid = 5,
    /// Right switch in bottom position (level).
    SwRPosBot = 6,
    /// Left mouse button pressed (edge).
    MouseLPress = 7,
    /// Right mouse button pressed (edge).
    MouseRPress = 8,
    KeyWPress = 9,
    KeySPress = 10,
    KeyDPress = 11,
    KeyAPress = 12,
    KeyShiftPress = 13,
    KeyCtrlPress = 14,
    KeyQPress = 15,
    KeyEPress = 16,
    KeyRPress = 17,
    KeyFPress = 18,
    KeyGPress = 19,
    KeyZPress = 20,
    KeyXPress = 21,
    KeyCPress = 22,
    KeyVPress = 23,
    KeyBPress = 24,
}

impl CmdEvent {
    /// The single-bit set holding only this event.
    #[inline]
    pub const fn flag(self) -> EventSet {
        EventSet::from_bits_retain(1 << self as u32)
    }
}

bitflags! {
    /// Set of events active during one command tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventSet: u32 {
        const LOST_CTRL     = 1 << 0;
        const SW_L_POS_TOP  = 1 << 1;
        const SW_L_POS_MID  = 1 << 2;
        const SW_L_POS_BOT  = 1 << 3;
        const SW_R_POS_TOP  = 1 << 4;
        const SW_R_POS_MID  = 1 << 5;
        const SW_R_POS_BOT  = 1 << 6;
        const MOUSE_L_PRESS = 1 << 7;
        const MOUSE_R_PRESS = 1 << 8;
        const KEY_W_PRESS     = 1 << 9;
        const KEY_S_PRESS     = 1 << 10;
        const KEY_D_PRESS     = 1 << 11;
        const KEY_A_PRESS     = 1 << 12;
        const KEY_SHIFT_PRESS = 1 << 13;
        const KEY_CTRL_PRESS  = 1 << 14;
        const KEY_Q_PRESS     = 1 << 15;
        const KEY_E_PRESS     = 1 << 16;
        const KEY_R_PRESS     = 1 << 17;
        const KEY_F_PRESS     = 1 << 18;
        const KEY_G_PRESS     = 1 << 19;
        const KEY_Z_PRESS     = 1 << 20;
        const KEY_X_PRESS     = 1 << 21;
        const KEY_C_PRESS     = 1 << 22;
        const KEY_V_PRESS     = 1 << 23;
        const KEY_B_PRESS     = 1 << 24;
    }
}

impl EventSet {
    /// True if `event` is active in this set.
    #[inline]
    pub const fn has(&self, event: CmdEvent) -> bool {
        self.contains(event.flag())
    }
}

/// Three-position switch on the remote control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SwitchPos {
    /// Not decoded yet / invalid frame.
    #[default]
    Unknown = 0,
    Top = 1,
    Mid = 2,
    Bot = 3,
}

bitflags! {
    /// Keyboard keys held, in remote-control receiver bit order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Keys: u16 {
        const W     = 1 << 0;
        const S     = 1 << 1;
        const D     = 1 << 2;
        const A     = 1 << 3;
        const SHIFT = 1 << 4;
        const CTRL  = 1 << 5;
        const Q     = 1 << 6;
        const E     = 1 << 7;
        const R     = 1 << 8;
        const F     = 1 << 9;
        const G     = 1 << 10;
        const Z     = 1 << 11;
        const X     = 1 << 12;
        const C     = 1 << 13;
        const V     = 1 << 14;
        const B     = 1 << 15;
    }
}

/// Key → press-event table, in key bit order.
pub const KEY_EVENTS: [(Keys, CmdEvent); 16] = [
    (Keys::W, CmdEvent::KeyWPress),
    (Keys::S, CmdEvent::KeySPress),
    (Keys::D, CmdEvent::KeyDPress),
    (Keys::A, CmdEvent::KeyAPress),
    (Keys::SHIFT, CmdEvent::KeyShiftPress),
    (Keys::CTRL, CmdEvent::KeyCtrlPress),
    (Keys::Q, CmdEvent::KeyQPress),
    (Keys::E, CmdEvent::KeyEPress),
    (Keys::R, CmdEvent::KeyRPress),
    (Keys::F, CmdEvent::KeyFPress),
    (Keys::G, CmdEvent::KeyGPress),
    (Keys::Z, CmdEvent::KeyZPress),
    (Keys::X, CmdEvent::KeyXPress),
    (Keys::C, CmdEvent::KeyCPress),
    (Keys::V, CmdEvent::KeyVPress),
    (Keys::B, CmdEvent::KeyBPress),
];
