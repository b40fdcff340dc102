//! Integration test: operator switch sequences through the command task into
//! the launcher and chassis modes.

use std::time::{Duration, Instant};

use rmcs_common::event::SwitchPos;
use rmcs_common::mode::{ChassisMode, FireMode};
use rmcs_common::msg::{LauncherFeedback, RcInput, RefereeForLauncher};
use rmcs_control_unit::cycle::ControlTask;
use rmcs_control_unit::runtime::Runtime;
use rmcs_control_unit::task::{CmdTask, LauncherTask};

use super::{shipped_config, tick};

const DT: f64 = 0.002;

struct Rig {
    rt: Runtime,
    cmd: CmdTask,
    launcher: LauncherTask,
    t0: Instant,
    index: u64,
}

impl Rig {
    fn new() -> Self {
        let rt = Runtime::new(shipped_config());
        let cmd = CmdTask::new(&rt.config).unwrap();
        let launcher = LauncherTask::new(&rt.config).unwrap();
        rt.referee.launcher.publish(referee(0.0));
        Self {
            rt,
            cmd,
            launcher,
            t0: Instant::now(),
            index: 0,
        }
    }

    /// Hold `rc` for `ticks` command + launcher steps.
    fn hold(&mut self, rc: RcInput, ticks: u64) {
        for _ in 0..ticks {
            let now = self.t0 + Duration::from_millis(2 * self.index);
            self.rt.feedback.rc.publish(rc);
            self.rt.feedback.launcher.publish(LauncherFeedback::default());
            self.cmd.step(&self.rt, &tick(self.index, now, DT));
            self.launcher.step(&self.rt, &tick(self.index, now, DT));
            self.index += 1;
        }
    }

    fn fire_mode(&self) -> FireMode {
        self.rt.ui.launcher.peek().unwrap().fire_mode
    }

    fn shots(&self) -> u32 {
        self.rt.ui.launcher.peek().unwrap().shots
    }
}

fn referee(heat: f64) -> RefereeForLauncher {
    RefereeForLauncher {
        online: true,
        heat_limit: 240.0,
        heat,
        heat_per_shot: 10.0,
    }
}

fn right(pos: SwitchPos) -> RcInput {
    RcInput {
        sw_l: SwitchPos::Top,
        sw_r: pos,
        ..Default::default()
    }
}

#[test]
fn right_switch_walks_fire_modes() {
    let mut rig = Rig::new();

    rig.hold(right(SwitchPos::Top), 5);
    assert_eq!(rig.fire_mode(), FireMode::Safe);

    rig.hold(right(SwitchPos::Mid), 5);
    assert_eq!(rig.fire_mode(), FireMode::Loaded);
    assert_eq!(rig.shots(), 0);

    // Held bottom fires continuously, paced by the minimum launch delay
    // (50 ms = 25 ticks): 100 ticks make four shots.
    rig.hold(right(SwitchPos::Bot), 100);
    let shots = rig.shots();
    assert!((3..=4).contains(&shots), "{shots}");

    rig.hold(right(SwitchPos::Top), 5);
    assert_eq!(rig.fire_mode(), FireMode::Safe);
    assert_eq!(rig.shots(), shots);
}

#[test]
fn heat_limit_blocks_shots() {
    let mut rig = Rig::new();
    rig.hold(right(SwitchPos::Mid), 5);

    rig.rt.referee.launcher.publish(referee(235.0));
    rig.hold(right(SwitchPos::Bot), 50);
    assert_eq!(rig.shots(), 0);

    rig.rt.referee.launcher.publish(referee(0.0));
    rig.hold(right(SwitchPos::Bot), 5);
    assert_eq!(rig.shots(), 1);
}

#[test]
fn mouse_click_fires_one_shot() {
    let mut rig = Rig::new();
    rig.hold(right(SwitchPos::Mid), 5);

    let click = RcInput {
        mouse_l: true,
        ..right(SwitchPos::Mid)
    };
    rig.hold(click, 1);
    rig.hold(right(SwitchPos::Mid), 50);
    assert_eq!(rig.shots(), 1);
}

#[test]
fn left_switch_walks_chassis_modes() {
    let mut rig = Rig::new();
    let left = |pos| RcInput {
        sw_l: pos,
        sw_r: SwitchPos::Mid,
        ..Default::default()
    };

    let expected = [
        (SwitchPos::Top, ChassisMode::Relax),
        (SwitchPos::Mid, ChassisMode::Independent),
        (SwitchPos::Bot, ChassisMode::Rotor),
        (SwitchPos::Mid, ChassisMode::Independent),
    ];
    for (pos, mode) in expected {
        rig.hold(left(pos), 2);
        assert_eq!(rig.rt.cmd.chassis.peek().unwrap().mode, mode, "{pos:?}");
    }
}
