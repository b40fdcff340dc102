//! System-wide constants for the RMCS workspace.
//!
//! Single source of truth for numeric limits, default task rates and
//! fail-safe ceilings. Imported by all crates; never redefine them locally.

/// Number of chassis wheel motors (mecanum / omni layouts).
pub const CHASSIS_MOTOR_NUM: usize = 4;

/// Number of launcher friction wheels.
pub const LAUNCHER_FRIC_NUM: usize = 2;

/// Maximum number of entries in one module's event map.
pub const MAX_EVENT_MAP_LEN: usize = 16;

/// Default command task rate [Hz].
pub const TASK_FREQ_CMD: u32 = 500;

/// Default chassis control task rate [Hz].
pub const TASK_FREQ_CTRL_CHASSIS: u32 = 500;

/// Default gimbal control task rate [Hz].
pub const TASK_FREQ_CTRL_GIMBAL: u32 = 500;

/// Default launcher control task rate [Hz].
pub const TASK_FREQ_CTRL_LAUNCHER: u32 = 500;

/// Default capacitor control task rate [Hz].
pub const TASK_FREQ_CTRL_CAP: u32 = 100;

/// Lowest accepted task rate [Hz].
pub const TASK_FREQ_MIN: u32 = 1;

/// Highest accepted task rate [Hz].
pub const TASK_FREQ_MAX: u32 = 2000;

/// Capacitor feedback receive timeout [ms]. Expiry takes the capacitor offline.
pub const CAP_FEEDBACK_TIMEOUT_MS: u64 = 500;

/// Remote-control receive timeout [ms]. Expiry raises loss of control.
pub const RC_TIMEOUT_MS: u64 = 100;

/// Motor feedback receive timeout [ms] for chassis/gimbal/launcher tasks.
pub const MOTOR_FEEDBACK_TIMEOUT_MS: u64 = 20;

/// Chassis power ceiling [W] used when neither the capacitor nor the referee
/// can authorize more.
pub const GAME_CHASSIS_MAX_POWER_WO_REF: f64 = 40.0;

/// Default capacitor cutoff voltage [V] (energy below this is unusable).
pub const CAP_CUTOFF_VOLT: f64 = 15.0;

/// Default capacitor full-charge voltage [V].
pub const CAP_FULL_VOLT: f64 = 24.0;

/// Default chassis power buffer target [J].
pub const CHASSIS_POWER_BUFFER_TARGET: f64 = 40.0;
