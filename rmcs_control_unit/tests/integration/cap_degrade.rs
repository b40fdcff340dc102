//! Integration test: capacitor online → feedback timeout → offline → recovery.

use std::time::{Duration, Instant};

use rmcs_common::consts::GAME_CHASSIS_MAX_POWER_WO_REF;
use rmcs_common::msg::{CapFeedback, RefereeForCap};
use rmcs_control_unit::cycle::ControlTask;
use rmcs_control_unit::runtime::Runtime;
use rmcs_control_unit::task::CapTask;

use super::{shipped_config, tick};

fn runtime(timeout_ms: u64) -> Runtime {
    let mut cfg = shipped_config();
    cfg.timeouts.cap_feedback_ms = timeout_ms;
    Runtime::new(cfg)
}

fn feedback(volt: f64) -> CapFeedback {
    CapFeedback {
        input_volt: 24.0,
        cap_volt: volt,
        input_curr: 1.0,
        target_power: 0.0,
    }
}

#[test]
fn cap_degrades_on_timeout_and_recovers() {
    let rt = runtime(30);
    let mut task = CapTask::new(&rt.config).unwrap();
    rt.referee.cap.publish(RefereeForCap {
        online: true,
        chassis_power_limit: 80.0,
        chassis_power_buffer: 40.0,
    });

    // Online at full voltage, buffer on target: request the whole budget.
    rt.feedback.cap.publish(feedback(24.0));
    task.step(&rt, &tick(0, Instant::now(), 0.01));
    let state = rt.cap_state.peek().unwrap();
    assert!(state.is_online);
    assert!((state.remaining_energy_pct - 1.0).abs() < 1e-9);
    assert!((rt.output.cap.peek().unwrap().requested_power - 80.0).abs() < 1e-9);

    // Nothing arrives: the step blocks for the timeout, then degrades.
    let start = Instant::now();
    task.step(&rt, &tick(1, Instant::now(), 0.01));
    assert!(start.elapsed() >= Duration::from_millis(30));
    let state = rt.cap_state.peek().unwrap();
    assert!(!state.is_online);
    assert_eq!(state.remaining_energy_pct, 0.0);
    assert_eq!(
        rt.output.cap.peek().unwrap().requested_power,
        GAME_CHASSIS_MAX_POWER_WO_REF
    );
    let ui = rt.ui.cap.peek().unwrap();
    assert!(!ui.online);
    assert_eq!(ui.percentage, 0.0);

    // Stays offline while quiet.
    task.step(&rt, &tick(2, Instant::now(), 0.01));
    assert!(!rt.cap_state.peek().unwrap().is_online);

    // The next sample brings it straight back.
    rt.feedback.cap.publish(feedback(19.5));
    task.step(&rt, &tick(3, Instant::now(), 0.01));
    let state = rt.cap_state.peek().unwrap();
    assert!(state.is_online);
    assert!(state.remaining_energy_pct > 0.0 && state.remaining_energy_pct < 1.0);
    assert!(rt.ui.cap.peek().unwrap().online);
}

#[test]
fn low_buffer_lowers_the_request() {
    let rt = runtime(30);
    let mut task = CapTask::new(&rt.config).unwrap();
    rt.referee.cap.publish(RefereeForCap {
        online: true,
        chassis_power_limit: 80.0,
        chassis_power_buffer: 10.0,
    });
    rt.feedback.cap.publish(feedback(22.0));
    task.step(&rt, &tick(0, Instant::now(), 0.01));
    let requested = rt.output.cap.peek().unwrap().requested_power;
    assert!(requested < 80.0, "{requested}");
    assert!(requested >= 0.0);
}

#[test]
fn referee_offline_uses_fixed_budget() {
    let rt = runtime(30);
    let mut task = CapTask::new(&rt.config).unwrap();
    rt.feedback.cap.publish(feedback(22.0));
    task.step(&rt, &tick(0, Instant::now(), 0.01));
    assert!(rt.cap_state.peek().unwrap().is_online);
    assert_eq!(
        rt.output.cap.peek().unwrap().requested_power,
        GAME_CHASSIS_MAX_POWER_WO_REF
    );
}

#[test]
fn never_seen_cap_reports_offline() {
    let rt = runtime(5);
    let mut task = CapTask::new(&rt.config).unwrap();
    task.step(&rt, &tick(0, Instant::now(), 0.01));
    assert!(!task.controller().is_online());
    assert!(!rt.ui.cap.peek().unwrap().online);
}
