//! Simulated device bus.
//!
//! Stands in for the CAN/IMU/referee collaborators when the binary runs
//! without hardware: consumes the output mailboxes, integrates first-order
//! motor models and publishes decoded feedback, a scripted remote-control
//! program and referee budgets. Capacitor feedback and the remote control
//! can be cut for a window to exercise the degrade paths.

use core::f64::consts::TAU;
use std::time::{Duration, Instant};

use rmcs_common::consts::{CAP_FULL_VOLT, CHASSIS_MOTOR_NUM, LAUNCHER_FRIC_NUM};
use rmcs_common::event::SwitchPos;
use rmcs_common::msg::{
    CapFeedback, ChassisFeedback, Eulr, GimbalFeedback, ImuSample, LauncherFeedback,
    MotorFeedback, RcInput, RefereeForCap, RefereeForChassis, RefereeForLauncher, Vector3,
};
use tracing::info;

use crate::cycle::{ControlTask, Tick};
use crate::runtime::Runtime;

/// Fault injection windows, measured from the first simulation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimOptions {
    /// Stop capacitor feedback at this time.
    pub cap_dropout_at: Option<Duration>,
    /// Stop remote-control frames at this time.
    pub rc_offline_at: Option<Duration>,
    /// Length of each outage.
    pub outage: Duration,
}

impl SimOptions {
    fn in_window(&self, start: Option<Duration>, t: Duration) -> bool {
        start.is_some_and(|s| t >= s && t < s + self.outage)
    }
}

/// `y' = (gain * u - y) / tau`.
#[derive(Debug, Clone, Copy)]
struct FirstOrder {
    value: f64,
    gain: f64,
    tau: f64,
}

impl FirstOrder {
    const fn new(gain: f64, tau: f64) -> Self {
        Self {
            value: 0.0,
            gain,
            tau,
        }
    }

    fn step(&mut self, input: f64, dt: f64) -> f64 {
        let alpha = (dt / self.tau).min(1.0);
        self.value += (self.gain * input - self.value) * alpha;
        self.value
    }
}

/// A motor with speed dynamics and an integrated rotor angle.
#[derive(Debug, Clone, Copy)]
struct SimMotor {
    /// Speed [rpm].
    speed: FirstOrder,
    /// Rotor angle, unwrapped [rad].
    angle: f64,
}

impl SimMotor {
    const fn new(max_rpm: f64, tau: f64) -> Self {
        Self {
            speed: FirstOrder::new(max_rpm, tau),
            angle: 0.0,
        }
    }

    fn step(&mut self, current: f64, dt: f64) {
        let rpm = self.speed.step(current, dt);
        self.angle += rpm * TAU / 60.0 * dt;
    }

    /// Feedback with the encoder reading offset by `zero`.
    fn feedback(&self, zero: f64) -> MotorFeedback {
        MotorFeedback {
            rotor_angle: (self.angle + zero).rem_euclid(TAU),
            rotor_speed: self.speed.value,
            torque_current: 0.0,
            temp: 35.0,
        }
    }
}

/// Scripted operator: six second loop over the main modes.
pub fn scripted_rc(t: Duration) -> RcInput {
    let s = t.as_secs_f64() % 6.0;
    let mut rc = RcInput {
        sw_l: SwitchPos::Top,
        sw_r: SwitchPos::Top,
        ..Default::default()
    };
    if s >= 1.0 {
        rc.sw_l = SwitchPos::Mid;
        rc.sw_r = SwitchPos::Mid;
        rc.ch_l_y = 0.5;
        rc.ch_r_x = 0.2 * (s * 2.0).sin();
    }
    if s >= 3.0 {
        rc.sw_l = SwitchPos::Bot;
        rc.ch_l_y = 0.0;
        rc.ch_l_x = 0.3;
        rc.mouse_l = (s * 2.0).fract() < 0.5;
    }
    rc
}

#[derive(Debug)]
pub struct SimBus {
    options: SimOptions,
    start: Option<Instant>,
    wheels: [SimMotor; CHASSIS_MOTOR_NUM],
    yaw: SimMotor,
    pit: SimMotor,
    fric: [SimMotor; LAUNCHER_FRIC_NUM],
    trig: SimMotor,
    cap_volt: f64,
    heat: f64,
    last_shots: u32,
    cap_cut: bool,
    rc_cut: bool,
}

impl SimBus {
    pub fn new(options: SimOptions) -> Self {
        Self {
            options,
            start: None,
            wheels: [SimMotor::new(9000.0, 0.08); CHASSIS_MOTOR_NUM],
            // Gimbal motors: unit current → 30 rpm at the output.
            yaw: SimMotor::new(30.0, 0.03),
            pit: SimMotor::new(30.0, 0.03),
            fric: [SimMotor::new(12000.0, 0.15); LAUNCHER_FRIC_NUM],
            // Rotor side of the trigger gearbox.
            trig: SimMotor::new(9000.0, 0.02),
            cap_volt: 20.0,
            heat: 0.0,
            last_shots: 0,
            cap_cut: false,
            rc_cut: false,
        }
    }

    fn step_models(&mut self, rt: &Runtime, dt: f64) {
        let chassis = rt.output.chassis.peek().unwrap_or_default();
        for (motor, cur) in self.wheels.iter_mut().zip(chassis.motor_cur) {
            motor.step(cur, dt);
        }
        let gimbal = rt.output.gimbal.peek().unwrap_or_default();
        self.yaw.step(gimbal.yaw, dt);
        self.pit.step(gimbal.pit, dt);
        // Pitch has hard stops.
        self.pit.angle = self.pit.angle.clamp(-0.6, 0.7);

        let launcher = rt.output.launcher.peek().unwrap_or_default();
        for (motor, cur) in self.fric.iter_mut().zip(launcher.fric_cur) {
            motor.step(cur, dt);
        }
        self.trig.step(launcher.trig_cur, dt);

        let draw: f64 = chassis.motor_cur.iter().map(|c| c.abs()).sum();
        self.cap_volt += ((CAP_FULL_VOLT - self.cap_volt) * 0.2 - draw * 0.5) * dt;
        self.cap_volt = self.cap_volt.clamp(0.0, CAP_FULL_VOLT);

        let shots = rt.ui.launcher.peek().map_or(0, |ui| ui.shots);
        self.heat += 10.0 * f64::from(shots.wrapping_sub(self.last_shots));
        self.heat = (self.heat - 40.0 * dt).max(0.0);
        self.last_shots = shots;
    }

    fn publish(&mut self, rt: &Runtime, t: Duration) {
        let gimbal_cfg = &rt.config.gimbal;

        let mut chassis = ChassisFeedback::default();
        for (fb, motor) in chassis.motors.iter_mut().zip(&self.wheels) {
            *fb = motor.feedback(0.0);
        }
        rt.feedback.chassis.publish(chassis);

        rt.feedback.gimbal.publish(GimbalFeedback {
            yaw: self.yaw.feedback(gimbal_cfg.mech_zero.yaw),
            pit: self.pit.feedback(gimbal_cfg.mech_zero.pit),
        });
        rt.feedback.imu.publish(ImuSample {
            eulr: Eulr {
                yaw: (self.yaw.angle + TAU / 2.0).rem_euclid(TAU) - TAU / 2.0,
                pit: self.pit.angle,
                rol: 0.0,
            },
            gyro: Vector3 {
                x: self.pit.speed.value * TAU / 60.0,
                y: 0.0,
                z: self.yaw.speed.value * TAU / 60.0,
            },
        });

        let mut launcher = LauncherFeedback {
            trig: self.trig.feedback(0.0),
            ..Default::default()
        };
        for (fb, motor) in launcher.fric.iter_mut().zip(&self.fric) {
            *fb = motor.feedback(0.0);
        }
        rt.feedback.launcher.publish(launcher);

        let cap_cut = self.options.in_window(self.options.cap_dropout_at, t);
        if cap_cut != self.cap_cut {
            info!(cut = cap_cut, "sim: capacitor feedback");
            self.cap_cut = cap_cut;
        }
        if !cap_cut {
            rt.feedback.cap.publish(CapFeedback {
                input_volt: 24.0,
                cap_volt: self.cap_volt,
                input_curr: 2.0,
                target_power: rt.output.cap.peek().map_or(0.0, |o| o.requested_power),
            });
        }

        let rc_cut = self.options.in_window(self.options.rc_offline_at, t);
        if rc_cut != self.rc_cut {
            info!(cut = rc_cut, "sim: remote control");
            self.rc_cut = rc_cut;
        }
        if !rc_cut {
            rt.feedback.rc.publish(scripted_rc(t));
        }

        rt.referee.cap.publish(RefereeForCap {
            online: true,
            chassis_power_limit: 80.0,
            chassis_power_buffer: 60.0,
        });
        rt.referee.chassis.publish(RefereeForChassis {
            online: true,
            chassis_power_limit: 80.0,
            chassis_watt: 0.0,
        });
        rt.referee.launcher.publish(RefereeForLauncher {
            online: true,
            heat_limit: 240.0,
            heat: self.heat,
            heat_per_shot: 10.0,
        });
    }
}

impl ControlTask for SimBus {
    fn name(&self) -> &'static str {
        "sim"
    }

    fn step(&mut self, rt: &Runtime, tick: &Tick) {
        let start = *self.start.get_or_insert(tick.now);
        let t = tick.now.saturating_duration_since(start);
        self.step_models(rt, tick.dt);
        self.publish(rt, t);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
