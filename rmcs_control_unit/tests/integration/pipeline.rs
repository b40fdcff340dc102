//! Integration test: the threaded pipeline against the simulated bus.
//!
//! Timing assertions leave wide margins; the tasks run without RT
//! scheduling here.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rmcs_common::mode::{FireMode, GimbalMode};
use rmcs_control_unit::cycle::{TaskHandle, spawn_task};
use rmcs_control_unit::runtime::Runtime;
use rmcs_control_unit::sim::{SimBus, SimOptions};
use rmcs_control_unit::task::spawn_control_tasks;

use super::shipped_config;

fn start(options: SimOptions, cap_timeout_ms: u64) -> (Arc<Runtime>, Vec<TaskHandle>) {
    let mut cfg = shipped_config();
    cfg.timeouts.cap_feedback_ms = cap_timeout_ms;
    let rt = Arc::new(Runtime::new(cfg));
    let mut handles = spawn_control_tasks(&rt).unwrap();
    let sim_spec = rt.config.tasks.sim;
    handles.push(spawn_task(SimBus::new(options), Arc::clone(&rt), sim_spec).unwrap());
    (rt, handles)
}

fn shutdown(rt: &Runtime, handles: Vec<TaskHandle>) {
    rt.stop();
    for h in handles {
        let name = h.name();
        let stats = h.join().unwrap();
        assert!(stats.cycle_count > 0, "{name} never ran");
    }
}

#[test]
fn pipeline_runs_end_to_end() {
    let (rt, handles) = start(SimOptions::default(), 500);
    thread::sleep(Duration::from_millis(400));

    // Scripted operator starts with both switches up.
    let cmd_ui = rt.ui.cmd.peek().unwrap();
    assert!(cmd_ui.rc_online);
    assert_eq!(rt.ui.gimbal.peek().unwrap().mode, GimbalMode::Absolute);
    assert_eq!(rt.ui.launcher.peek().unwrap().fire_mode, FireMode::Safe);
    assert!(rt.ui.cap.peek().unwrap().online);
    assert!(rt.output.chassis.seq() > 10);
    assert!(rt.output.gimbal.seq() > 10);
    assert!(rt.output.launcher.seq() > 10);
    assert!(rt.output.cap.seq() > 2);

    shutdown(&rt, handles);
}

#[test]
fn cap_dropout_degrades_then_recovers() {
    let options = SimOptions {
        cap_dropout_at: Some(Duration::from_millis(100)),
        rc_offline_at: None,
        outage: Duration::from_millis(600),
    };
    let (rt, handles) = start(options, 100);

    thread::sleep(Duration::from_millis(500));
    assert!(!rt.ui.cap.peek().unwrap().online);
    assert!(!rt.cap_state.peek().unwrap().is_online);

    thread::sleep(Duration::from_millis(600));
    assert!(rt.ui.cap.peek().unwrap().online);

    shutdown(&rt, handles);
}

#[test]
fn rc_outage_relaxes_gimbal() {
    let options = SimOptions {
        cap_dropout_at: None,
        rc_offline_at: Some(Duration::from_millis(100)),
        outage: Duration::from_millis(600),
    };
    let (rt, handles) = start(options, 500);

    thread::sleep(Duration::from_millis(450));
    assert!(!rt.ui.cmd.peek().unwrap().rc_online);
    assert_eq!(rt.ui.gimbal.peek().unwrap().mode, GimbalMode::Relax);
    assert_eq!(rt.ui.launcher.peek().unwrap().fire_mode, FireMode::Relax);

    thread::sleep(Duration::from_millis(600));
    assert!(rt.ui.cmd.peek().unwrap().rc_online);
    assert_eq!(rt.ui.gimbal.peek().unwrap().mode, GimbalMode::Absolute);

    shutdown(&rt, handles);
}
