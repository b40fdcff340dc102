//! Declarative event → action tables.
//!
//! Each module owns one [`EventMap`]: a priority-ordered list of
//! `(event, action)` pairs dispatched once per command tick against the
//! active [`EventSet`].
//!
//! ## Dispatch rules
//!
//! 1. If `LOST_CTRL` is active, the map's loss-of-control action (always a
//!    Relax action) is applied and nothing else is looked at.
//! 2. Otherwise items are visited in priority order; the first active item
//!    whose action changes the module state wins and dispatch stops.
//!
//! Construction rejects maps with no `lost_ctrl` entry, with a `lost_ctrl`
//! entry that is not Relax, or with more than [`MAX_EVENT_MAP_LEN`] items.

use heapless::Vec;
use rmcs_common::consts::MAX_EVENT_MAP_LEN;
use rmcs_common::event::{CmdEvent, EventSet};
use rmcs_common::mode::ModeAction;
use serde::{Deserialize, Serialize};

use crate::error::ControlError;

/// One `(event, action)` pair.
///
/// `priority` orders items (lower first). Items without one take their
/// declaration index; equal priorities keep declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventMapItem<A> {
    pub event: CmdEvent,
    pub action: A,
    #[serde(default)]
    pub priority: Option<u8>,
}

impl<A> EventMapItem<A> {
    /// Item with declaration-order priority.
    pub const fn new(event: CmdEvent, action: A) -> Self {
        Self {
            event,
            action,
            priority: None,
        }
    }
}

/// Receiver of event-map actions.
pub trait EventHandler {
    type Action: ModeAction;

    /// Apply `action`; return `true` if the module state changed.
    fn handle(&mut self, action: Self::Action) -> bool;
}

/// What one dispatch pass did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch<A> {
    /// Loss of control forced the Relax action.
    LostCtrl(A),
    /// An item fired and changed the module state.
    Handled { event: CmdEvent, action: A },
    /// No active item changed anything.
    Unchanged,
}

/// Validated, priority-sorted event map for one module.
#[derive(Debug, Clone)]
pub struct EventMap<A> {
    module: &'static str,
    items: Vec<EventMapItem<A>, MAX_EVENT_MAP_LEN>,
    lost_ctrl: A,
}

impl<A: ModeAction> EventMap<A> {
    /// Validate and sort `items` for `module`.
    ///
    /// # Errors
    ///
    /// `EventMapFull`, `MissingLostCtrl` or `LostCtrlNotRelax`.
    pub fn new(module: &'static str, items: &[EventMapItem<A>]) -> Result<Self, ControlError> {
        let full = || ControlError::EventMapFull {
            module,
            len: items.len(),
            cap: MAX_EVENT_MAP_LEN,
        };

        let mut keyed: Vec<(usize, EventMapItem<A>), MAX_EVENT_MAP_LEN> = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            let key = item.priority.map_or(idx, usize::from);
            keyed.push((key, *item)).map_err(|_| full())?;
        }

        let mut lost_ctrl = None;
        for (_, item) in keyed.iter().filter(|(_, i)| i.event == CmdEvent::LostCtrl) {
            if !item.action.is_relax() {
                return Err(ControlError::LostCtrlNotRelax { module });
            }
            lost_ctrl.get_or_insert(item.action);
        }
        let lost_ctrl = lost_ctrl.ok_or(ControlError::MissingLostCtrl { module })?;

        keyed.sort_by_key(|(key, _)| *key);
        let mut sorted = Vec::new();
        for (_, item) in keyed {
            sorted.push(item).map_err(|_| full())?;
        }

        Ok(Self {
            module,
            items: sorted,
            lost_ctrl,
        })
    }

    /// Module name used in diagnostics.
    #[inline]
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Items in dispatch order.
    #[inline]
    pub fn items(&self) -> &[EventMapItem<A>] {
        &self.items
    }

    /// Action applied on loss of control.
    #[inline]
    pub fn lost_ctrl_action(&self) -> A {
        self.lost_ctrl
    }

    /// Dispatch the active `events` to `handler`.
    pub fn dispatch<H>(&self, events: EventSet, handler: &mut H) -> Dispatch<A>
    where
        H: EventHandler<Action = A>,
    {
        if events.has(CmdEvent::LostCtrl) {
            handler.handle(self.lost_ctrl);
            return Dispatch::LostCtrl(self.lost_ctrl);
        }

        for item in &self.items {
            if events.has(item.event) && handler.handle(item.action) {
                return Dispatch::Handled {
                    event: item.event,
                    action: item.action,
                };
            }
        }
        Dispatch::Unchanged
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
