//! Remote-control snapshot → per-tick event set.
//!
//! Switch positions are level events (asserted every tick they hold). Keys
//! and mouse buttons produce a press event only on the tick they go down.
//! A missing snapshot means loss of control and yields `LOST_CTRL` alone.

use rmcs_common::event::{CmdEvent, EventSet, KEY_EVENTS, Keys, SwitchPos};
use rmcs_common::msg::RcInput;

/// Edge detector over successive remote-control snapshots.
#[derive(Debug, Clone, Default)]
pub struct EventSource {
    prev_keys: Keys,
    prev_mouse_l: bool,
    prev_mouse_r: bool,
    /// Next online snapshot only seeds edge state.
    resync: bool,
}

impl EventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build this tick's event set. `None` means the remote control is offline.
    pub fn update(&mut self, rc: Option<&RcInput>) -> EventSet {
        let Some(rc) = rc else {
            self.resync = true;
            return EventSet::LOST_CTRL;
        };

        let mut events = switch_event(rc.sw_l, Side::Left) | switch_event(rc.sw_r, Side::Right);

        if self.resync {
            self.resync = false;
        } else {
            let pressed = rc.keys & !self.prev_keys;
            for (key, event) in KEY_EVENTS {
                if pressed.contains(key) {
                    events |= event.flag();
                }
            }
            if rc.mouse_l && !self.prev_mouse_l {
                events |= EventSet::MOUSE_L_PRESS;
            }
            if rc.mouse_r && !self.prev_mouse_r {
                events |= EventSet::MOUSE_R_PRESS;
            }
        }

        self.prev_keys = rc.keys;
        self.prev_mouse_l = rc.mouse_l;
        self.prev_mouse_r = rc.mouse_r;
        events
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

fn switch_event(pos: SwitchPos, side: Side) -> EventSet {
    let event = match (side, pos) {
        (_, SwitchPos::Unknown) => return EventSet::empty(),
        (Side::Left, SwitchPos::Top) => CmdEvent::SwLPosTop,
        (Side::Left, SwitchPos::Mid) => CmdEvent::SwLPosMid,
        (Side::Left, SwitchPos::Bot) => CmdEvent::SwLPosBot,
        (Side::Right, SwitchPos::Top) => CmdEvent::SwRPosTop,
        (Side::Right, SwitchPos::Mid) => CmdEvent::SwRPosMid,
        (Side::Right, SwitchPos::Bot) => CmdEvent::SwRPosBot,
    };
    event.flag()
}
