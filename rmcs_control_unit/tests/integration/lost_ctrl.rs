//! Integration test: remote-control timeout relaxes every module on the same
//! tick, and the operator's switches take over again when it returns.

use std::thread;
use std::time::{Duration, Instant};

use rmcs_common::event::{EventSet, SwitchPos};
use rmcs_common::mode::{ChassisMode, FireMode, GimbalMode};
use rmcs_common::msg::{ChassisFeedback, RcInput};
use rmcs_control_unit::cycle::ControlTask;
use rmcs_control_unit::runtime::Runtime;
use rmcs_control_unit::task::{ChassisTask, CmdTask};

use super::{shipped_config, tick};

fn runtime() -> Runtime {
    let mut cfg = shipped_config();
    cfg.timeouts.rc_ms = 20;
    Runtime::new(cfg)
}

fn operator() -> RcInput {
    RcInput {
        sw_l: SwitchPos::Mid,
        sw_r: SwitchPos::Mid,
        ch_l_y: 0.6,
        ..Default::default()
    }
}

#[test]
fn rc_timeout_relaxes_all_modules() {
    let rt = runtime();
    let mut cmd = CmdTask::new(&rt.config).unwrap();

    rt.feedback.rc.publish(operator());
    cmd.step(&rt, &tick(0, Instant::now(), 0.002));
    assert_eq!(rt.cmd.chassis.peek().unwrap().mode, ChassisMode::Independent);
    assert_eq!(rt.cmd.gimbal.peek().unwrap().mode, GimbalMode::Absolute);
    assert_eq!(rt.cmd.launcher.peek().unwrap().fire_mode, FireMode::Loaded);
    assert!(rt.ui.cmd.peek().unwrap().rc_online);

    thread::sleep(Duration::from_millis(40));
    cmd.step(&rt, &tick(1, Instant::now(), 0.002));

    let chassis = rt.cmd.chassis.peek().unwrap();
    assert_eq!(chassis.mode, ChassisMode::Relax);
    assert_eq!(chassis.ctrl_vec.vx, 0.0);
    assert_eq!(rt.cmd.gimbal.peek().unwrap().mode, GimbalMode::Relax);
    assert_eq!(rt.cmd.launcher.peek().unwrap().fire_mode, FireMode::Relax);
    let ui = rt.ui.cmd.peek().unwrap();
    assert!(!ui.rc_online);
    assert_eq!(ui.events, EventSet::LOST_CTRL);
}

#[test]
fn modes_return_with_the_remote() {
    let rt = runtime();
    let mut cmd = CmdTask::new(&rt.config).unwrap();

    rt.feedback.rc.publish(operator());
    cmd.step(&rt, &tick(0, Instant::now(), 0.002));
    thread::sleep(Duration::from_millis(40));
    cmd.step(&rt, &tick(1, Instant::now(), 0.002));
    assert_eq!(rt.cmd.chassis.peek().unwrap().mode, ChassisMode::Relax);

    rt.feedback.rc.publish(operator());
    cmd.step(&rt, &tick(2, Instant::now(), 0.002));
    let chassis = rt.cmd.chassis.peek().unwrap();
    assert_eq!(chassis.mode, ChassisMode::Independent);
    assert!((chassis.ctrl_vec.vx - 0.6).abs() < 1e-12);
    assert_eq!(rt.cmd.launcher.peek().unwrap().fire_mode, FireMode::Loaded);
}

#[test]
fn relaxed_chassis_outputs_zero_current() {
    let rt = runtime();
    let mut cmd = CmdTask::new(&rt.config).unwrap();
    let mut chassis = ChassisTask::new(&rt.config).unwrap();

    rt.feedback.chassis.publish(ChassisFeedback::default());
    rt.feedback.rc.publish(RcInput {
        sw_l: SwitchPos::Top,
        ch_l_y: 1.0,
        ..Default::default()
    });
    cmd.step(&rt, &tick(0, Instant::now(), 0.002));
    chassis.step(&rt, &tick(0, Instant::now(), 0.002));

    assert_eq!(rt.ui.chassis.peek().unwrap().mode, ChassisMode::Relax);
    assert_eq!(rt.output.chassis.peek().unwrap().motor_cur, [0.0; 4]);
}
