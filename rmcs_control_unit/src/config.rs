//! Robot configuration: TOML loader with validation.
//!
//! One file describes the whole robot: task rates and priorities, liveness
//! timeouts, per-module actuator tables, geometry and event maps. Loading
//! parses then validates; validation builds every actuator and event map
//! once, so a table that loads can always be turned into running components.

use std::path::Path;

use rmcs_common::config::{ConfigError, ConfigLoader, SharedConfig};
use rmcs_common::consts::{
    CAP_CUTOFF_VOLT, CAP_FEEDBACK_TIMEOUT_MS, CAP_FULL_VOLT, CHASSIS_MOTOR_NUM,
    CHASSIS_POWER_BUFFER_TARGET, LAUNCHER_FRIC_NUM, MOTOR_FEEDBACK_TIMEOUT_MS, RC_TIMEOUT_MS,
    TASK_FREQ_CMD, TASK_FREQ_CTRL_CAP, TASK_FREQ_CTRL_CHASSIS, TASK_FREQ_CTRL_GIMBAL,
    TASK_FREQ_CTRL_LAUNCHER, TASK_FREQ_MAX, TASK_FREQ_MIN,
};
use rmcs_common::control::{ActuatorParams, PidParams};
use rmcs_common::mode::{ChassisAction, GimbalAction, LauncherAction, ModeAction};
use serde::{Deserialize, Serialize};

use crate::command::event_map::{EventMap, EventMapItem};
use crate::control::actuator::Actuator;
use crate::control::pid::Pid;

// ─── Top level ──────────────────────────────────────────────────────

/// Complete robot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub tasks: TaskTable,
    #[serde(default)]
    pub timeouts: Timeouts,
    #[serde(default)]
    pub cmd: CmdConfig,
    pub chassis: ChassisConfig,
    pub gimbal: GimbalConfig,
    pub launcher: LauncherConfig,
    #[serde(default)]
    pub cap: CapConfig,
}

// ─── Tasks & timeouts ───────────────────────────────────────────────

/// Rate and static priority of one periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub freq_hz: u32,
    /// SCHED_FIFO priority (applied with the `rt` feature only).
    pub priority: i32,
    /// CPU core to pin the task thread to (`rt` feature only).
    #[serde(default)]
    pub cpu: Option<usize>,
}

impl TaskSpec {
    pub const fn new(freq_hz: u32, priority: i32) -> Self {
        Self {
            freq_hz,
            priority,
            cpu: None,
        }
    }

    /// Nominal period [s].
    #[inline]
    pub fn period_s(&self) -> f64 {
        1.0 / f64::from(self.freq_hz)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTable {
    #[serde(default = "default_cmd_task")]
    pub cmd: TaskSpec,
    #[serde(default = "default_chassis_task")]
    pub chassis: TaskSpec,
    #[serde(default = "default_gimbal_task")]
    pub gimbal: TaskSpec,
    #[serde(default = "default_launcher_task")]
    pub launcher: TaskSpec,
    #[serde(default = "default_cap_task")]
    pub cap: TaskSpec,
    /// Simulated device bus (binary only).
    #[serde(default = "default_sim_task")]
    pub sim: TaskSpec,
}

fn default_cmd_task() -> TaskSpec {
    TaskSpec::new(TASK_FREQ_CMD, 84)
}
fn default_chassis_task() -> TaskSpec {
    TaskSpec::new(TASK_FREQ_CTRL_CHASSIS, 83)
}
fn default_gimbal_task() -> TaskSpec {
    TaskSpec::new(TASK_FREQ_CTRL_GIMBAL, 83)
}
fn default_launcher_task() -> TaskSpec {
    TaskSpec::new(TASK_FREQ_CTRL_LAUNCHER, 83)
}
fn default_cap_task() -> TaskSpec {
    TaskSpec::new(TASK_FREQ_CTRL_CAP, 83)
}
fn default_sim_task() -> TaskSpec {
    TaskSpec::new(1000, 85)
}

impl Default for TaskTable {
    fn default() -> Self {
        Self {
            cmd: default_cmd_task(),
            chassis: default_chassis_task(),
            gimbal: default_gimbal_task(),
            launcher: default_launcher_task(),
            cap: default_cap_task(),
            sim: default_sim_task(),
        }
    }
}

impl TaskTable {
    fn iter(&self) -> [(&'static str, TaskSpec); 6] {
        [
            ("cmd", self.cmd),
            ("chassis", self.chassis),
            ("gimbal", self.gimbal),
            ("launcher", self.launcher),
            ("cap", self.cap),
            ("sim", self.sim),
        ]
    }
}

/// Mailbox receive timeouts [ms].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    /// Remote control; expiry raises loss of control.
    #[serde(default = "default_rc_ms")]
    pub rc_ms: u64,
    /// Capacitor feedback; expiry takes the capacitor offline.
    #[serde(default = "default_cap_ms")]
    pub cap_feedback_ms: u64,
    /// Motor feedback freshness; stale feedback zeroes module outputs.
    #[serde(default = "default_motor_ms")]
    pub motor_feedback_ms: u64,
}

fn default_rc_ms() -> u64 {
    RC_TIMEOUT_MS
}
fn default_cap_ms() -> u64 {
    CAP_FEEDBACK_TIMEOUT_MS
}
fn default_motor_ms() -> u64 {
    MOTOR_FEEDBACK_TIMEOUT_MS
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            rc_ms: RC_TIMEOUT_MS,
            cap_feedback_ms: CAP_FEEDBACK_TIMEOUT_MS,
            motor_feedback_ms: MOTOR_FEEDBACK_TIMEOUT_MS,
        }
    }
}

// ─── Command source ─────────────────────────────────────────────────

/// Remote-control → command scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmdConfig {
    /// Gimbal rate per full stick deflection [rad/s].
    #[serde(default = "default_sens_stick")]
    pub sens_stick: f64,
    /// Gimbal rate per mouse count [rad/s].
    #[serde(default = "default_sens_mouse")]
    pub sens_mouse: f64,
    /// Chassis command for a held movement key, in `[0, 1]`.
    #[serde(default = "default_key_move")]
    pub key_move: f64,
}

fn default_sens_stick() -> f64 {
    3.0
}
fn default_sens_mouse() -> f64 {
    0.05
}
fn default_key_move() -> f64 {
    0.7
}

impl Default for CmdConfig {
    fn default() -> Self {
        Self {
            sens_stick: default_sens_stick(),
            sens_mouse: default_sens_mouse(),
            key_move: default_key_move(),
        }
    }
}

// ─── Modules ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChassisConfig {
    /// Wheel speed actuators, one per motor (front-left, front-right,
    /// back-left, back-right).
    pub wheel: Vec<ActuatorParams>,
    /// Follow-gimbal heading loop (cyclic).
    pub follow: PidParams,
    /// Wheel speed for a unit mixer output [rpm].
    #[serde(default = "default_max_wheel_rpm")]
    pub max_wheel_rpm: f64,
    /// Rotation command in Rotor mode, in `[-1, 1]`.
    #[serde(default = "default_rotor_wz")]
    pub rotor_wz: f64,
    /// Power estimate per unit of |current × rpm| [W].
    #[serde(default = "default_power_coeff")]
    pub power_coeff: f64,
    pub event_map: Vec<EventMapItem<ChassisAction>>,
}

fn default_max_wheel_rpm() -> f64 {
    8000.0
}
fn default_rotor_wz() -> f64 {
    0.8
}
fn default_power_coeff() -> f64 {
    0.02
}

/// Per-axis angle pair [rad].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct YawPitch {
    pub yaw: f64,
    pub pit: f64,
}

/// Pitch travel relative to the mechanical zero [rad].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchLimit {
    pub pitch_min: f64,
    pub pitch_max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GimbalConfig {
    /// Yaw angle → rate cascade.
    pub yaw: ActuatorParams,
    /// Pitch angle → rate cascade.
    pub pit: ActuatorParams,
    /// Encoder angles at which the gimbal faces forward and level.
    pub mech_zero: YawPitch,
    pub limit: PitchLimit,
    pub event_map: Vec<EventMapItem<GimbalAction>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Trigger wheel position → speed cascade.
    pub trig: ActuatorParams,
    /// Friction wheel speed actuators.
    pub fric: Vec<ActuatorParams>,
    /// Teeth on the trigger wheel (one projectile per tooth).
    pub num_trig_tooth: f64,
    /// Trigger motor gearbox ratio.
    pub trig_gear_ratio: f64,
    /// Friction wheel radius [m].
    pub fric_radius: f64,
    /// Cover servo duty when open.
    pub cover_open_duty: f64,
    /// Cover servo duty when closed.
    pub cover_close_duty: f64,
    /// Projectile speed [m/s].
    pub bullet_speed: f64,
    /// Minimum interval between shots [ms].
    pub min_launch_delay_ms: u64,
    pub event_map: Vec<EventMapItem<LauncherAction>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapConfig {
    /// Voltage below which stored energy is unusable [V].
    #[serde(default = "default_cutoff_volt")]
    pub cutoff_volt: f64,
    /// Fully charged voltage [V].
    #[serde(default = "default_full_volt")]
    pub full_volt: f64,
    /// Chassis power buffer to hold [J].
    #[serde(default = "default_buffer_target")]
    pub buffer_target: f64,
    /// Buffer energy loop: output is the power correction [W].
    #[serde(default = "default_buffer_loop")]
    pub buffer: ActuatorParams,
}

fn default_cutoff_volt() -> f64 {
    CAP_CUTOFF_VOLT
}
fn default_full_volt() -> f64 {
    CAP_FULL_VOLT
}
fn default_buffer_target() -> f64 {
    CHASSIS_POWER_BUFFER_TARGET
}
fn default_buffer_loop() -> ActuatorParams {
    ActuatorParams::speed(PidParams::proportional(1.0, 40.0))
}

impl Default for CapConfig {
    fn default() -> Self {
        Self {
            cutoff_volt: CAP_CUTOFF_VOLT,
            full_volt: CAP_FULL_VOLT,
            buffer_target: CHASSIS_POWER_BUFFER_TARGET,
            buffer: default_buffer_loop(),
        }
    }
}

// ─── Loading ────────────────────────────────────────────────────────

/// Load and validate a robot configuration file.
pub fn load_config(path: &Path) -> Result<RobotConfig, ConfigError> {
    let config = RobotConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a robot configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<RobotConfig, ConfigError> {
    let config = RobotConfig::parse(content)?;
    config.validate()?;
    Ok(config)
}

// ─── Validation ─────────────────────────────────────────────────────

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

fn check_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(format!("{name} must be positive, got {value}")));
    }
    Ok(())
}

fn check_actuator(name: &str, params: &ActuatorParams, freq_hz: u32) -> Result<(), ConfigError> {
    Actuator::new(params, f64::from(freq_hz))
        .map(|_| ())
        .map_err(|e| invalid(format!("{name}: {e}")))
}

fn check_event_map<A: ModeAction>(
    module: &'static str,
    items: &[EventMapItem<A>],
) -> Result<(), ConfigError> {
    EventMap::new(module, items)
        .map(|_| ())
        .map_err(|e| invalid(e.to_string()))
}

impl RobotConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.validate_tasks()?;
        self.validate_chassis()?;
        self.validate_gimbal()?;
        self.validate_launcher()?;
        self.validate_cap()?;
        Ok(())
    }

    fn validate_tasks(&self) -> Result<(), ConfigError> {
        for (name, spec) in self.tasks.iter() {
            if !(TASK_FREQ_MIN..=TASK_FREQ_MAX).contains(&spec.freq_hz) {
                return Err(invalid(format!(
                    "tasks.{name}.freq_hz {} out of range [{TASK_FREQ_MIN}, {TASK_FREQ_MAX}]",
                    spec.freq_hz
                )));
            }
            if !(1..=99).contains(&spec.priority) {
                return Err(invalid(format!(
                    "tasks.{name}.priority {} out of range [1, 99]",
                    spec.priority
                )));
            }
        }
        let t = &self.timeouts;
        for (name, ms) in [
            ("rc_ms", t.rc_ms),
            ("cap_feedback_ms", t.cap_feedback_ms),
            ("motor_feedback_ms", t.motor_feedback_ms),
        ] {
            if ms == 0 {
                return Err(invalid(format!("timeouts.{name} must be positive")));
            }
        }
        check_positive("cmd.sens_stick", self.cmd.sens_stick)?;
        check_positive("cmd.sens_mouse", self.cmd.sens_mouse)?;
        if !(0.0..=1.0).contains(&self.cmd.key_move) {
            return Err(invalid(format!(
                "cmd.key_move {} out of range [0, 1]",
                self.cmd.key_move
            )));
        }
        Ok(())
    }

    fn validate_chassis(&self) -> Result<(), ConfigError> {
        let c = &self.chassis;
        let freq = self.tasks.chassis.freq_hz;
        if c.wheel.len() != CHASSIS_MOTOR_NUM {
            return Err(invalid(format!(
                "chassis.wheel has {} entries, expected {CHASSIS_MOTOR_NUM}",
                c.wheel.len()
            )));
        }
        for (i, w) in c.wheel.iter().enumerate() {
            check_actuator(&format!("chassis.wheel[{i}]"), w, freq)?;
        }
        Pid::new(&c.follow, f64::from(freq))
            .map_err(|e| invalid(format!("chassis.follow: {e}")))?;
        if !c.follow.cycle {
            return Err(invalid("chassis.follow must be cyclic".to_string()));
        }
        check_positive("chassis.max_wheel_rpm", c.max_wheel_rpm)?;
        check_positive("chassis.power_coeff", c.power_coeff)?;
        if !(-1.0..=1.0).contains(&c.rotor_wz) {
            return Err(invalid(format!(
                "chassis.rotor_wz {} out of range [-1, 1]",
                c.rotor_wz
            )));
        }
        check_event_map("chassis", &c.event_map)
    }

    fn validate_gimbal(&self) -> Result<(), ConfigError> {
        let g = &self.gimbal;
        let freq = self.tasks.gimbal.freq_hz;
        for (name, params) in [("gimbal.yaw", &g.yaw), ("gimbal.pit", &g.pit)] {
            if !params.is_cascade() {
                return Err(invalid(format!("{name} must be a position cascade")));
            }
            check_actuator(name, params, freq)?;
        }
        if g.limit.pitch_min >= g.limit.pitch_max {
            return Err(invalid(format!(
                "gimbal.limit.pitch_min {} must be below pitch_max {}",
                g.limit.pitch_min, g.limit.pitch_max
            )));
        }
        check_event_map("gimbal", &g.event_map)
    }

    fn validate_launcher(&self) -> Result<(), ConfigError> {
        let l = &self.launcher;
        let freq = self.tasks.launcher.freq_hz;
        if !l.trig.is_cascade() {
            return Err(invalid("launcher.trig must be a position cascade".to_string()));
        }
        check_actuator("launcher.trig", &l.trig, freq)?;
        if l.fric.len() != LAUNCHER_FRIC_NUM {
            return Err(invalid(format!(
                "launcher.fric has {} entries, expected {LAUNCHER_FRIC_NUM}",
                l.fric.len()
            )));
        }
        for (i, f) in l.fric.iter().enumerate() {
            check_actuator(&format!("launcher.fric[{i}]"), f, freq)?;
        }
        check_positive("launcher.num_trig_tooth", l.num_trig_tooth)?;
        check_positive("launcher.trig_gear_ratio", l.trig_gear_ratio)?;
        check_positive("launcher.fric_radius", l.fric_radius)?;
        check_positive("launcher.bullet_speed", l.bullet_speed)?;
        for (name, duty) in [
            ("cover_open_duty", l.cover_open_duty),
            ("cover_close_duty", l.cover_close_duty),
        ] {
            if !(0.0..=1.0).contains(&duty) {
                return Err(invalid(format!("launcher.{name} {duty} out of range [0, 1]")));
            }
        }
        check_event_map("launcher", &l.event_map)
    }

    fn validate_cap(&self) -> Result<(), ConfigError> {
        let c = &self.cap;
        check_positive("cap.cutoff_volt", c.cutoff_volt)?;
        if c.full_volt <= c.cutoff_volt {
            return Err(invalid(format!(
                "cap.full_volt {} must exceed cutoff_volt {}",
                c.full_volt, c.cutoff_volt
            )));
        }
        if !c.buffer_target.is_finite() || c.buffer_target < 0.0 {
            return Err(invalid(format!(
                "cap.buffer_target {} must be non-negative",
                c.buffer_target
            )));
        }
        check_actuator("cap.buffer", &c.buffer, self.tasks.cap.freq_hz)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
