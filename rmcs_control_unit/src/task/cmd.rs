//! Command task: remote control → events → modes → per-module commands.
//!
//! All three event maps are dispatched here against the same event set, so
//! loss of control relaxes every module on the same tick.

use rmcs_common::event::{EventSet, Keys};
use rmcs_common::mode::{ChassisAction, GimbalAction, LauncherAction};
use rmcs_common::msg::{ChassisCmd, CmdUi, Eulr, GimbalCmd, LauncherCmd, MoveVector, RcInput};
use tracing::{info, warn};

use crate::command::event_map::EventMap;
use crate::command::mode::{ChassisModeState, GimbalModeState, LauncherModeState};
use crate::command::source::EventSource;
use crate::config::{CmdConfig, RobotConfig};
use crate::cycle::{ControlTask, Tick};
use crate::error::ControlError;
use crate::mailbox::ReadCursor;
use crate::runtime::Runtime;

/// Key-driven axis value: `+amount` for `pos`, `-amount` for `neg`.
fn key_axis(keys: Keys, pos: Keys, neg: Keys, amount: f64) -> f64 {
    let mut v = 0.0;
    if keys.contains(pos) {
        v += amount;
    }
    if keys.contains(neg) {
        v -= amount;
    }
    v
}

/// Chassis motion request from sticks and movement keys.
pub fn move_vector(rc: &RcInput, cfg: &CmdConfig) -> MoveVector {
    let vx = rc.ch_l_y + key_axis(rc.keys, Keys::W, Keys::S, cfg.key_move);
    let vy = -rc.ch_l_x + key_axis(rc.keys, Keys::A, Keys::D, cfg.key_move);
    MoveVector {
        vx: vx.clamp(-1.0, 1.0),
        vy: vy.clamp(-1.0, 1.0),
        wz: (-rc.ch_r_x).clamp(-1.0, 1.0),
    }
}

/// Gimbal attitude increment for one tick of length `dt` [s].
pub fn gimbal_delta(rc: &RcInput, cfg: &CmdConfig, dt: f64) -> Eulr {
    Eulr {
        yaw: -(rc.ch_r_x * cfg.sens_stick + rc.mouse_x * cfg.sens_mouse) * dt,
        pit: (rc.ch_r_y * cfg.sens_stick - rc.mouse_y * cfg.sens_mouse) * dt,
        rol: 0.0,
    }
}

pub struct CmdTask {
    cfg: CmdConfig,
    source: EventSource,
    rc_cursor: ReadCursor,
    last_rc: Option<RcInput>,
    rc_online: bool,
    chassis_map: EventMap<ChassisAction>,
    gimbal_map: EventMap<GimbalAction>,
    launcher_map: EventMap<LauncherAction>,
    chassis: ChassisModeState,
    gimbal: GimbalModeState,
    launcher: LauncherModeState,
    fire_seq: u32,
}

impl CmdTask {
    pub fn new(config: &RobotConfig) -> Result<Self, ControlError> {
        Ok(Self {
            cfg: config.cmd,
            source: EventSource::new(),
            rc_cursor: ReadCursor::default(),
            last_rc: None,
            rc_online: false,
            chassis_map: EventMap::new("chassis", &config.chassis.event_map)?,
            gimbal_map: EventMap::new("gimbal", &config.gimbal.event_map)?,
            launcher_map: EventMap::new("launcher", &config.launcher.event_map)?,
            chassis: ChassisModeState::default(),
            gimbal: GimbalModeState::default(),
            launcher: LauncherModeState::default(),
            fire_seq: 0,
        })
    }

    /// Current remote-control snapshot, or `None` once it has timed out.
    fn read_rc(&mut self, rt: &Runtime) -> Option<RcInput> {
        if let Some(rc) = rt.feedback.rc.try_recv(&mut self.rc_cursor) {
            self.last_rc = Some(rc);
        }
        if !rt.feedback.rc.is_fresh(rt.rc_timeout()) {
            self.last_rc = None;
        }
        let online = self.last_rc.is_some();
        if online != self.rc_online {
            if online {
                info!("remote control online");
            } else {
                warn!("remote control lost");
            }
            self.rc_online = online;
        }
        self.last_rc
    }

    /// Dispatch `events` to every module.
    pub fn dispatch(&mut self, events: EventSet) {
        self.chassis_map.dispatch(events, &mut self.chassis);
        self.gimbal_map.dispatch(events, &mut self.gimbal);
        self.launcher_map.dispatch(events, &mut self.launcher);
        if self.launcher.take_fire() {
            self.fire_seq = self.fire_seq.wrapping_add(1);
        }
    }

    /// Module commands for this tick.
    pub fn commands(&self, rc: Option<&RcInput>, dt: f64) -> (ChassisCmd, GimbalCmd, LauncherCmd) {
        let (ctrl_vec, delta) = match rc {
            Some(rc) => (move_vector(rc, &self.cfg), gimbal_delta(rc, &self.cfg, dt)),
            None => (MoveVector::default(), Eulr::default()),
        };
        (
            ChassisCmd {
                mode: self.chassis.mode(),
                ctrl_vec,
            },
            GimbalCmd {
                mode: self.gimbal.mode(),
                delta,
            },
            LauncherCmd {
                fire_mode: self.launcher.fire_mode(),
                fire_seq: self.fire_seq,
                cover_open: self.launcher.cover_open(),
            },
        )
    }
}

impl ControlTask for CmdTask {
    fn name(&self) -> &'static str {
        "cmd"
    }

    fn step(&mut self, rt: &Runtime, tick: &Tick) {
        let rc = self.read_rc(rt);
        let events = self.source.update(rc.as_ref());
        self.dispatch(events);

        let (chassis, gimbal, launcher) = self.commands(rc.as_ref(), tick.dt);
        rt.cmd.chassis.publish(chassis);
        rt.cmd.gimbal.publish(gimbal);
        rt.cmd.launcher.publish(launcher);
        rt.ui.cmd.publish(CmdUi {
            rc_online: rc.is_some(),
            events,
        });
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
