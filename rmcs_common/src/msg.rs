//! Mailbox payloads exchanged between tasks and external collaborators.
//!
//! Everything here is plain, fixed-layout `Copy` data: decoded feedback
//! (CAN/IMU ingress), decoded commands, referee budgets, per-module output
//! commands (CAN-encode egress) and UI summaries (display egress). Mailboxes
//! carry these by value, so no payload owns heap memory.

use static_assertions::const_assert_eq;

use crate::consts::{CHASSIS_MOTOR_NUM, LAUNCHER_FRIC_NUM};
use crate::event::{EventSet, Keys, SwitchPos};
use crate::mode::{ChassisMode, FireMode, GimbalMode};

// ─── §1: Feedback ingress ───────────────────────────────────────────

/// One decoded motor feedback frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct MotorFeedback {
    /// Rotor angle [rad], in `[0, 2π)`.
    pub rotor_angle: f64,
    /// Rotor speed [rpm].
    pub rotor_speed: f64,
    /// Torque current, normalized to `[-1, 1]`.
    pub torque_current: f64,
    /// Winding temperature [°C].
    pub temp: f64,
}

const_assert_eq!(core::mem::size_of::<MotorFeedback>(), 32);

/// Chassis wheel motors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct ChassisFeedback {
    pub motors: [MotorFeedback; CHASSIS_MOTOR_NUM],
}

/// Gimbal yaw/pitch motors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct GimbalFeedback {
    pub yaw: MotorFeedback,
    pub pit: MotorFeedback,
}

/// Launcher friction wheels and trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct LauncherFeedback {
    pub fric: [MotorFeedback; LAUNCHER_FRIC_NUM],
    pub trig: MotorFeedback,
}

/// Euler angles [rad].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct Eulr {
    pub yaw: f64,
    pub pit: f64,
    pub rol: f64,
}

/// Three-axis vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Attitude estimate and body rates from the IMU collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct ImuSample {
    /// Attitude [rad].
    pub eulr: Eulr,
    /// Body rates [rad/s]; `z` is yaw rate, `x` is pitch rate.
    pub gyro: Vector3,
}

/// Decoded super-capacitor controller feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct CapFeedback {
    /// Supply voltage [V].
    pub input_volt: f64,
    /// Capacitor bank voltage [V].
    pub cap_volt: f64,
    /// Supply current [A].
    pub input_curr: f64,
    /// Power the controller is currently drawing toward [W].
    pub target_power: f64,
}

// ─── §2: Command ingress ────────────────────────────────────────────

/// Decoded remote-control snapshot.
///
/// Sticks are normalized to `[-1, 1]`; mouse deltas are per-frame counts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RcInput {
    pub ch_l_x: f64,
    pub ch_l_y: f64,
    pub ch_r_x: f64,
    pub ch_r_y: f64,
    pub sw_l: SwitchPos,
    pub sw_r: SwitchPos,
    pub mouse_x: f64,
    pub mouse_y: f64,
    pub mouse_l: bool,
    pub mouse_r: bool,
    pub keys: Keys,
}

/// Chassis motion request in the gimbal frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveVector {
    /// Forward [-1, 1].
    pub vx: f64,
    /// Left [-1, 1].
    pub vy: f64,
    /// Counter-clockwise [-1, 1].
    pub wz: f64,
}

/// Per-tick chassis command.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChassisCmd {
    pub mode: ChassisMode,
    pub ctrl_vec: MoveVector,
}

/// Per-tick gimbal command: mode plus attitude increment [rad].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GimbalCmd {
    pub mode: GimbalMode,
    pub delta: Eulr,
}

/// Per-tick launcher command.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LauncherCmd {
    pub fire_mode: FireMode,
    /// Running count of shot requests; each increment asks for one shot.
    pub fire_seq: u32,
    pub cover_open: bool,
}

// ─── §3: Telemetry ingress (referee budgets) ────────────────────────

/// Referee data consumed by the capacitor controller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RefereeForCap {
    /// Referee link alive.
    pub online: bool,
    /// Chassis power limit [W].
    pub chassis_power_limit: f64,
    /// Remaining chassis power buffer [J].
    pub chassis_power_buffer: f64,
}

/// Referee data consumed by the chassis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RefereeForChassis {
    pub online: bool,
    /// Chassis power limit [W].
    pub chassis_power_limit: f64,
    /// Measured chassis power [W].
    pub chassis_watt: f64,
}

/// Referee data consumed by the launcher.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RefereeForLauncher {
    pub online: bool,
    /// Barrel heat limit.
    pub heat_limit: f64,
    /// Current barrel heat.
    pub heat: f64,
    /// Heat added by one shot.
    pub heat_per_shot: f64,
}

// ─── §4: Egress (output commands) ───────────────────────────────────

/// Chassis wheel currents, normalized to `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct ChassisOutput {
    pub motor_cur: [f64; CHASSIS_MOTOR_NUM],
}

/// Gimbal motor currents, normalized to `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct GimbalOutput {
    pub yaw: f64,
    pub pit: f64,
}

/// Launcher currents and cover servo duty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct LauncherOutput {
    pub fric_cur: [f64; LAUNCHER_FRIC_NUM],
    pub trig_cur: f64,
    pub cover_duty: f64,
}

/// Capacitor controller command.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct CapOutput {
    /// Power the chassis may draw [W].
    pub requested_power: f64,
}

// ─── §5: UI summaries ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChassisUi {
    pub mode: ChassisMode,
    /// Chassis heading relative to the gimbal [rad].
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GimbalUi {
    pub mode: GimbalMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LauncherUi {
    pub fire_mode: FireMode,
    pub cover_open: bool,
    pub shots: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CapUi {
    /// Usable energy in `[0, 1]`.
    pub percentage: f64,
    pub online: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CmdUi {
    pub rc_online: bool,
    pub events: EventSet,
}

// ─── §6: Inter-task state ───────────────────────────────────────────

/// Capacitor condition published by the capacitor task for the chassis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct CapState {
    /// Capacitor bank voltage [V].
    pub voltage: f64,
    /// Usable energy in `[0, 1]`.
    pub remaining_energy_pct: f64,
    /// False once feedback has timed out.
    pub is_online: bool,
}
