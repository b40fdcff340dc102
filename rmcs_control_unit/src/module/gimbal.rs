//! Two-axis gimbal.
//!
//! Both axes are angle → rate cascades. Absolute mode closes the angle loop
//! on IMU attitude, Relative mode on encoder angles measured from the
//! mechanical zero. Setpoints are integrated from per-tick command deltas
//! and pitch is held inside limits expressed relative to the mechanical zero
//! in either mode.

use core::f64::consts::TAU;

use rmcs_common::mode::GimbalMode;
use rmcs_common::msg::{GimbalCmd, GimbalFeedback, GimbalOutput, GimbalUi, ImuSample};

use crate::config::{GimbalConfig, PitchLimit, YawPitch};
use crate::control::actuator::{Actuator, ActuatorFeedback};
use crate::control::pid::cyclic_error;
use crate::error::ControlError;
use crate::module::rpm_to_rad_s;

/// Wrap an angle into `[-π, π]`.
#[inline]
fn wrap(angle: f64) -> f64 {
    cyclic_error(angle, 0.0, TAU)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GimbalInput {
    pub cmd: GimbalCmd,
    pub feedback: GimbalFeedback,
    pub imu: ImuSample,
}

/// Angles and rates in the active mode's frame.
#[derive(Debug, Clone, Copy)]
struct Measured {
    yaw: f64,
    pit: f64,
    yaw_rate: f64,
    pit_rate: f64,
}

#[derive(Debug, Clone)]
pub struct Gimbal {
    yaw: Actuator,
    pit: Actuator,
    mech_zero: YawPitch,
    limit: PitchLimit,
    mode: GimbalMode,
    setpoint: YawPitch,
    yaw_offset: f64,
}

impl Gimbal {
    pub fn new(config: &GimbalConfig, sample_freq: f64) -> Result<Self, ControlError> {
        Ok(Self {
            yaw: Actuator::new(&config.yaw, sample_freq)?,
            pit: Actuator::new(&config.pit, sample_freq)?,
            mech_zero: config.mech_zero,
            limit: config.limit,
            mode: GimbalMode::Relax,
            setpoint: YawPitch::default(),
            yaw_offset: 0.0,
        })
    }

    #[inline]
    pub fn mode(&self) -> GimbalMode {
        self.mode
    }

    /// Angle setpoints in the active frame [rad].
    #[inline]
    pub fn setpoint(&self) -> YawPitch {
        self.setpoint
    }

    /// Gimbal yaw relative to the chassis [rad], from the latest feedback.
    #[inline]
    pub fn yaw_offset(&self) -> f64 {
        self.yaw_offset
    }

    fn encoder_angles(&self, fb: &GimbalFeedback) -> YawPitch {
        YawPitch {
            yaw: wrap(fb.yaw.rotor_angle - self.mech_zero.yaw),
            pit: wrap(fb.pit.rotor_angle - self.mech_zero.pit),
        }
    }

    fn measure(&self, mode: GimbalMode, input: &GimbalInput, enc: &YawPitch) -> Measured {
        match mode {
            GimbalMode::Relative => Measured {
                yaw: enc.yaw,
                pit: enc.pit,
                yaw_rate: rpm_to_rad_s(input.feedback.yaw.rotor_speed),
                pit_rate: rpm_to_rad_s(input.feedback.pit.rotor_speed),
            },
            GimbalMode::Relax | GimbalMode::Absolute => Measured {
                yaw: input.imu.eulr.yaw,
                pit: input.imu.eulr.pit,
                yaw_rate: input.imu.gyro.z,
                pit_rate: input.imu.gyro.x,
            },
        }
    }

    fn set_mode(&mut self, mode: GimbalMode, m: &Measured) {
        if mode == self.mode {
            return;
        }
        if mode != GimbalMode::Relax {
            // New frame: hold where the gimbal is now.
            self.setpoint = YawPitch { yaw: m.yaw, pit: m.pit };
            self.yaw.reset(m.yaw);
            self.pit.reset(m.pit);
        }
        self.mode = mode;
    }

    /// Run one control step.
    pub fn step(&mut self, input: &GimbalInput, dt: f64) -> GimbalOutput {
        let enc = self.encoder_angles(&input.feedback);
        self.yaw_offset = enc.yaw;

        let m = self.measure(input.cmd.mode, input, &enc);
        self.set_mode(input.cmd.mode, &m);
        if self.mode == GimbalMode::Relax {
            return GimbalOutput::default();
        }

        let delta = &input.cmd.delta;
        if delta.yaw.is_finite() {
            self.setpoint.yaw = wrap(self.setpoint.yaw + delta.yaw);
        }
        if delta.pit.is_finite() {
            self.setpoint.pit += delta.pit;
        }
        // Pitch limits live in the encoder frame.
        let frame_offset = enc.pit - m.pit;
        self.setpoint.pit = self.setpoint.pit.clamp(
            self.limit.pitch_min - frame_offset,
            self.limit.pitch_max - frame_offset,
        );

        let yaw_fb = ActuatorFeedback {
            position: m.yaw,
            speed: m.yaw_rate,
            position_rate: Some(m.yaw_rate),
        };
        let pit_fb = ActuatorFeedback {
            position: m.pit,
            speed: m.pit_rate,
            position_rate: Some(m.pit_rate),
        };
        GimbalOutput {
            yaw: self.yaw.calculate(self.setpoint.yaw, &yaw_fb, dt),
            pit: self.pit.calculate(self.setpoint.pit, &pit_fb, dt),
        }
    }

    pub fn ui(&self) -> GimbalUi {
        GimbalUi { mode: self.mode }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
