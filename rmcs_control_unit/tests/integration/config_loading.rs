//! Integration test: loading the shipped robot file and rejecting bad ones.

use std::io::Write;

use rmcs_common::config::{ConfigError, LogLevel};
use rmcs_common::event::CmdEvent;
use rmcs_common::mode::ChassisAction;
use rmcs_control_unit::config::{load_config, load_config_from_str};
use rmcs_control_unit::task::spawn_control_tasks;
use tempfile::NamedTempFile;

use super::{shipped_config, shipped_config_path};

fn shipped_text() -> String {
    std::fs::read_to_string(shipped_config_path()).unwrap()
}

fn load_text(text: &str) -> Result<rmcs_control_unit::config::RobotConfig, ConfigError> {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    load_config(file.path())
}

#[test]
fn shipped_config_loads() {
    let cfg = shipped_config();
    assert_eq!(cfg.shared.robot_name, "sentry");
    assert_eq!(cfg.shared.log_level, LogLevel::Info);
    assert_eq!(cfg.tasks.cap.freq_hz, 100);
    assert_eq!(cfg.tasks.sim.freq_hz, 1000);
    assert_eq!(cfg.chassis.wheel.len(), 4);
    assert_eq!(cfg.launcher.fric.len(), 2);
    assert!(cfg.gimbal.yaw.is_cascade());
    assert_eq!(cfg.chassis.event_map[0].event, CmdEvent::LostCtrl);
    assert_eq!(cfg.chassis.event_map[0].action, ChassisAction::SetModeRelax);
}

#[test]
fn shipped_config_builds_every_task() {
    // Building is validated at load; spawning must then succeed.
    let rt = std::sync::Arc::new(rmcs_control_unit::runtime::Runtime::new(shipped_config()));
    let handles = spawn_control_tasks(&rt).unwrap();
    assert_eq!(handles.len(), 5);
    rt.stop();
    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn text_and_file_loading_agree() {
    let from_file = load_text(&shipped_text()).unwrap();
    let from_str = load_config_from_str(&shipped_text()).unwrap();
    assert_eq!(from_file.tasks, from_str.tasks);
    assert_eq!(from_file.timeouts, from_str.timeouts);
    assert_eq!(from_file.cap, from_str.cap);
}

#[test]
fn out_of_range_task_rate_is_rejected() {
    let text = shipped_text().replace(
        "cap      = { freq_hz = 100,",
        "cap      = { freq_hz = 5000,",
    );
    let err = load_text(&text).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)), "{err}");
}

#[test]
fn event_map_without_lost_ctrl_is_rejected() {
    let text = shipped_text().replace(
        "{ event = \"lost_ctrl\",     action = \"change_fire_mode_relax\" },",
        "",
    );
    let err = load_text(&text).unwrap_err();
    assert!(err.to_string().contains("lost_ctrl"), "{err}");
}

#[test]
fn unknown_event_name_is_a_parse_error() {
    let text = shipped_text().replace("\"mouse_l_press\"", "\"mouse_m_press\"");
    assert!(matches!(load_text(&text), Err(ConfigError::ParseError(_))));
}

#[test]
fn missing_module_section_is_a_parse_error() {
    let text = "[shared]\nrobot_name = \"bare\"\n";
    assert!(matches!(load_config_from_str(text), Err(ConfigError::ParseError(_))));
}
