//! Shared configuration tests.
//!
//! Exercises `ConfigLoader` with a robot-style table: the `[shared]` section,
//! control parameter tables and event/mode names as they appear in TOML.

use std::io::Write;
use std::path::Path;

use rmcs_common::prelude::*;
use serde::Deserialize;
use tempfile::NamedTempFile;

#[derive(Debug, Deserialize)]
struct Entry {
    event: CmdEvent,
    action: LauncherAction,
}

#[derive(Debug, Deserialize)]
struct Robot {
    shared: SharedConfig,
    trig: ActuatorParams,
    event_map: Vec<Entry>,
}

const ROBOT: &str = r#"
event_map = [
  { event = "lost_ctrl", action = "change_fire_mode_relax" },
  { event = "key_r_press", action = "open_cover" },
]

[shared]
log_level = "warn"
robot_name = "hero"

[trig.speed]
k = 1.5
p = 1.0
out_limit = 0.5

[trig.position]
p = 1.2
out_limit = 1.0
cycle = true
"#;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_robot_table_from_file() {
    let file = write_temp(ROBOT);
    let robot = Robot::load(file.path()).unwrap();

    assert_eq!(robot.shared.log_level, LogLevel::Warn);
    assert_eq!(robot.shared.log_level.as_level(), tracing::Level::WARN);
    robot.shared.validate().unwrap();

    assert!(robot.trig.is_cascade());
    assert_eq!(robot.trig.speed.k, 1.5);
    assert_eq!(robot.trig.position.unwrap().k, 1.0);
    assert!(robot.trig.in_cutoff_freq <= 0.0);

    assert_eq!(robot.event_map.len(), 2);
    assert_eq!(robot.event_map[0].event, CmdEvent::LostCtrl);
    assert!(robot.event_map[0].action.is_relax());
    assert_eq!(robot.event_map[1].event, CmdEvent::KeyRPress);
    assert_eq!(robot.event_map[1].action, LauncherAction::OpenCover);
}

#[test]
fn missing_file_is_reported() {
    let err = Robot::load(Path::new("/nonexistent/rmcs/robot.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound));
}

#[test]
fn unknown_event_is_a_parse_error() {
    let text = ROBOT.replace("key_r_press", "key_y_press");
    let err = Robot::parse(&text).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)), "{err}");
}

#[test]
fn unknown_log_level_is_a_parse_error() {
    let text = ROBOT.replace("\"warn\"", "\"loud\"");
    assert!(matches!(Robot::parse(&text), Err(ConfigError::ParseError(_))));
}

#[test]
fn empty_robot_name_fails_validation() {
    let text = ROBOT.replace("\"hero\"", "\"\"");
    let robot = Robot::parse(&text).unwrap();
    assert!(matches!(
        robot.shared.validate(),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn event_set_flags_match_events() {
    let set = CmdEvent::SwLPosMid.flag() | CmdEvent::MouseLPress.flag();
    assert!(set.has(CmdEvent::SwLPosMid));
    assert!(set.has(CmdEvent::MouseLPress));
    assert!(!set.has(CmdEvent::LostCtrl));
    assert_eq!(set, EventSet::SW_L_POS_MID | EventSet::MOUSE_L_PRESS);
}

#[test]
fn mode_defaults_are_safe() {
    assert_eq!(ChassisMode::default(), ChassisMode::Relax);
    assert_eq!(GimbalMode::default(), GimbalMode::Relax);
    assert_eq!(FireMode::default(), FireMode::Relax);
    assert_eq!(SwitchPos::default(), SwitchPos::Unknown);
    assert!(Keys::default().is_empty());
    assert!(GAME_CHASSIS_MAX_POWER_WO_REF > 0.0);
    assert!(CAP_FEEDBACK_TIMEOUT_MS > 0);
}
