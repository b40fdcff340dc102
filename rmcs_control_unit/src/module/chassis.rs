//! Mecanum chassis.
//!
//! The command vector arrives in the gimbal frame. Follow-gimbal and Rotor
//! rotate it into the chassis frame by the gimbal yaw offset; Independent
//! drives in the chassis frame directly. The mixer turns `(vx, vy, wz)` into
//! four wheel speeds, each closed by its own speed actuator.
//!
//! While the capacitor is offline the wheel currents are scaled so the
//! estimated draw stays inside the referee budget.

use rmcs_common::consts::{CHASSIS_MOTOR_NUM, GAME_CHASSIS_MAX_POWER_WO_REF};
use rmcs_common::mode::ChassisMode;
use rmcs_common::msg::{
    CapState, ChassisCmd, ChassisFeedback, ChassisOutput, ChassisUi, MoveVector,
    RefereeForChassis,
};

use crate::config::ChassisConfig;
use crate::control::actuator::{Actuator, ActuatorFeedback};
use crate::control::pid::Pid;
use crate::error::ControlError;

/// Mecanum mixer, wheel order front-left, front-right, back-left,
/// back-right; positive wheel speed drives the robot forward.
///
/// Outputs are normalized so the largest magnitude is at most 1.
pub fn mecanum_mix(v: &MoveVector) -> [f64; CHASSIS_MOTOR_NUM] {
    let mut out = [
        v.vx - v.vy - v.wz,
        v.vx + v.vy + v.wz,
        v.vx + v.vy - v.wz,
        v.vx - v.vy + v.wz,
    ];
    let peak = out.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    if peak > 1.0 {
        for x in &mut out {
            *x /= peak;
        }
    }
    out
}

/// Rotate a planar vector by `angle` [rad] (counter-clockwise).
#[inline]
fn rotate(vx: f64, vy: f64, angle: f64) -> (f64, f64) {
    let (s, c) = angle.sin_cos();
    (vx * c - vy * s, vx * s + vy * c)
}

/// Everything the chassis reads in one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChassisInput {
    pub cmd: ChassisCmd,
    pub feedback: ChassisFeedback,
    /// Gimbal yaw relative to the chassis [rad], counter-clockwise positive.
    pub yaw_offset: f64,
    pub cap: CapState,
    pub referee: RefereeForChassis,
}

#[derive(Debug, Clone)]
pub struct Chassis {
    wheels: [Actuator; CHASSIS_MOTOR_NUM],
    follow: Pid,
    max_wheel_rpm: f64,
    rotor_wz: f64,
    power_coeff: f64,
    mode: ChassisMode,
    yaw_offset: f64,
}

impl Chassis {
    pub fn new(config: &ChassisConfig, sample_freq: f64) -> Result<Self, ControlError> {
        let wheels = config
            .wheel
            .iter()
            .map(|params| Actuator::new(params, sample_freq))
            .collect::<Result<Vec<_>, _>>()?;
        let wheels: [Actuator; CHASSIS_MOTOR_NUM] =
            wheels.try_into().map_err(|w: Vec<Actuator>| ControlError::InvalidLimit {
                name: "chassis.wheel count",
                value: w.len() as f64,
            })?;
        Ok(Self {
            wheels,
            follow: Pid::new(&config.follow, sample_freq)?,
            max_wheel_rpm: config.max_wheel_rpm,
            rotor_wz: config.rotor_wz,
            power_coeff: config.power_coeff,
            mode: ChassisMode::Relax,
            yaw_offset: 0.0,
        })
    }

    #[inline]
    pub fn mode(&self) -> ChassisMode {
        self.mode
    }

    fn set_mode(&mut self, mode: ChassisMode) {
        if mode == self.mode {
            return;
        }
        if self.mode == ChassisMode::Relax {
            for wheel in &mut self.wheels {
                wheel.reset(0.0);
            }
            self.follow.reset();
        }
        self.mode = mode;
    }

    /// Chassis-frame motion for the current mode.
    fn motion(&mut self, cmd: &MoveVector, yaw_offset: f64, dt: f64) -> MoveVector {
        match self.mode {
            ChassisMode::Relax | ChassisMode::Break => MoveVector::default(),
            ChassisMode::Independent => *cmd,
            ChassisMode::FollowGimbal => {
                let (vx, vy) = rotate(cmd.vx, cmd.vy, yaw_offset);
                let wz = self.follow.step(yaw_offset, 0.0, dt);
                MoveVector { vx, vy, wz }
            }
            ChassisMode::Rotor => {
                let (vx, vy) = rotate(cmd.vx, cmd.vy, yaw_offset);
                MoveVector {
                    vx,
                    vy,
                    wz: self.rotor_wz,
                }
            }
        }
    }

    /// Estimated electrical draw of the commanded currents [W].
    pub fn estimate_power(&self, cur: &[f64; CHASSIS_MOTOR_NUM], fb: &ChassisFeedback) -> f64 {
        self.power_coeff
            * cur
                .iter()
                .zip(&fb.motors)
                .map(|(c, m)| (c * m.rotor_speed).abs())
                .sum::<f64>()
    }

    /// Run one control step.
    pub fn step(&mut self, input: &ChassisInput, dt: f64) -> ChassisOutput {
        self.set_mode(input.cmd.mode);
        self.yaw_offset = input.yaw_offset;
        if self.mode == ChassisMode::Relax {
            return ChassisOutput::default();
        }

        let motion = self.motion(&input.cmd.ctrl_vec, input.yaw_offset, dt);
        let targets = mecanum_mix(&motion);

        let mut motor_cur = [0.0; CHASSIS_MOTOR_NUM];
        for (i, wheel) in self.wheels.iter_mut().enumerate() {
            let fb = ActuatorFeedback::speed(input.feedback.motors[i].rotor_speed);
            motor_cur[i] = wheel.calculate(targets[i] * self.max_wheel_rpm, &fb, dt);
        }

        if !input.cap.is_online {
            let budget = if input.referee.online {
                input.referee.chassis_power_limit
            } else {
                GAME_CHASSIS_MAX_POWER_WO_REF
            };
            let est = self.estimate_power(&motor_cur, &input.feedback);
            if est > budget && est > 0.0 {
                let scale = budget.max(0.0) / est;
                for c in &mut motor_cur {
                    *c *= scale;
                }
            }
        }

        ChassisOutput { motor_cur }
    }

    pub fn ui(&self) -> ChassisUi {
        ChassisUi {
            mode: self.mode,
            angle: self.yaw_offset,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
