//! Projectile launcher: two friction wheels, an indexed trigger wheel and a
//! cover servo.
//!
//! Friction wheels spin at the speed that gives the configured projectile
//! speed while `Loaded`. Each accepted shot advances the trigger setpoint by
//! one tooth. Shots are spaced by the minimum launch delay and refused when
//! the referee reports too little heat headroom.

use core::f64::consts::TAU;
use std::time::{Duration, Instant};

use rmcs_common::consts::LAUNCHER_FRIC_NUM;
use rmcs_common::mode::FireMode;
use rmcs_common::msg::{
    LauncherCmd, LauncherFeedback, LauncherOutput, LauncherUi, RefereeForLauncher,
};
use tracing::debug;

use crate::config::LauncherConfig;
use crate::control::actuator::{Actuator, ActuatorFeedback};
use crate::control::pid::cyclic_error;
use crate::error::ControlError;
use crate::module::rpm_to_rad_s;

/// Friction wheel speed [rpm] for projectile speed `speed` [m/s].
#[inline]
pub fn fric_rpm(speed: f64, radius: f64) -> f64 {
    speed / (TAU * radius) * 60.0
}

/// True when the barrel can take one more shot.
pub fn heat_allows(referee: &RefereeForLauncher) -> bool {
    !referee.online || referee.heat_limit - referee.heat >= referee.heat_per_shot
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LauncherInput {
    pub cmd: LauncherCmd,
    pub feedback: LauncherFeedback,
    pub referee: RefereeForLauncher,
}

#[derive(Debug, Clone)]
pub struct Launcher {
    trig: Actuator,
    fric: [Actuator; LAUNCHER_FRIC_NUM],
    fric_rpm: f64,
    /// Trigger travel per shot [rad].
    tooth_angle: f64,
    trig_gear_ratio: f64,
    min_launch_delay: Duration,
    cover_open_duty: f64,
    cover_close_duty: f64,

    fire_mode: FireMode,
    cover_open: bool,
    /// Trigger output-shaft angle, unwrapped [rad].
    trig_angle: f64,
    last_rotor_angle: Option<f64>,
    trig_setpoint: f64,
    seen_fire_seq: Option<u32>,
    pending: bool,
    last_launch: Option<Instant>,
    shots: u32,
}

impl Launcher {
    pub fn new(config: &LauncherConfig, sample_freq: f64) -> Result<Self, ControlError> {
        let fric = config
            .fric
            .iter()
            .map(|params| Actuator::new(params, sample_freq))
            .collect::<Result<Vec<_>, _>>()?;
        let fric: [Actuator; LAUNCHER_FRIC_NUM] =
            fric.try_into()
                .map_err(|f: Vec<Actuator>| ControlError::InvalidLimit {
                    name: "launcher.fric count",
                    value: f.len() as f64,
                })?;
        Ok(Self {
            trig: Actuator::new(&config.trig, sample_freq)?,
            fric,
            fric_rpm: fric_rpm(config.bullet_speed, config.fric_radius),
            tooth_angle: TAU / config.num_trig_tooth,
            trig_gear_ratio: config.trig_gear_ratio,
            min_launch_delay: Duration::from_millis(config.min_launch_delay_ms),
            cover_open_duty: config.cover_open_duty,
            cover_close_duty: config.cover_close_duty,
            fire_mode: FireMode::Relax,
            cover_open: false,
            trig_angle: 0.0,
            last_rotor_angle: None,
            trig_setpoint: 0.0,
            seen_fire_seq: None,
            pending: false,
            last_launch: None,
            shots: 0,
        })
    }

    #[inline]
    pub fn fire_mode(&self) -> FireMode {
        self.fire_mode
    }

    /// Shots launched since start.
    #[inline]
    pub fn shots(&self) -> u32 {
        self.shots
    }

    #[inline]
    pub fn trig_setpoint(&self) -> f64 {
        self.trig_setpoint
    }

    /// Trigger output-shaft angle [rad].
    #[inline]
    pub fn trig_angle(&self) -> f64 {
        self.trig_angle
    }

    fn track_trigger(&mut self, rotor_angle: f64) {
        if !rotor_angle.is_finite() {
            return;
        }
        if let Some(last) = self.last_rotor_angle {
            self.trig_angle += cyclic_error(rotor_angle, last, TAU) / self.trig_gear_ratio;
        }
        self.last_rotor_angle = Some(rotor_angle);
    }

    fn set_fire_mode(&mut self, mode: FireMode) {
        if mode == self.fire_mode {
            return;
        }
        if self.fire_mode == FireMode::Relax {
            self.trig_setpoint = self.trig_angle;
            self.trig.reset(self.trig_setpoint);
            for fric in &mut self.fric {
                fric.reset(0.0);
            }
        }
        if mode != FireMode::Loaded {
            self.pending = false;
        }
        self.fire_mode = mode;
    }

    fn take_request(&mut self, fire_seq: u32) {
        match self.seen_fire_seq {
            Some(seen) if seen != fire_seq && self.fire_mode == FireMode::Loaded => {
                self.pending = true;
            }
            _ => {}
        }
        self.seen_fire_seq = Some(fire_seq);
    }

    fn try_launch(&mut self, referee: &RefereeForLauncher, now: Instant) {
        if !self.pending {
            return;
        }
        if !heat_allows(referee) {
            debug!(heat = referee.heat, limit = referee.heat_limit, "shot refused, heat");
            self.pending = false;
            return;
        }
        if self
            .last_launch
            .is_some_and(|t| now.saturating_duration_since(t) < self.min_launch_delay)
        {
            return;
        }
        self.trig_setpoint += self.tooth_angle;
        self.shots = self.shots.wrapping_add(1);
        self.last_launch = Some(now);
        self.pending = false;
    }

    /// Run one control step at time `now`.
    pub fn step(&mut self, input: &LauncherInput, now: Instant, dt: f64) -> LauncherOutput {
        let fb = &input.feedback;
        self.track_trigger(fb.trig.rotor_angle);
        self.set_fire_mode(input.cmd.fire_mode);
        self.take_request(input.cmd.fire_seq);
        self.cover_open = input.cmd.cover_open;

        let cover_duty = if self.cover_open {
            self.cover_open_duty
        } else {
            self.cover_close_duty
        };
        if self.fire_mode == FireMode::Relax {
            return LauncherOutput {
                cover_duty,
                ..Default::default()
            };
        }

        self.try_launch(&input.referee, now);

        let target = match self.fire_mode {
            FireMode::Loaded => self.fric_rpm,
            FireMode::Relax | FireMode::Safe => 0.0,
        };
        let mut fric_cur = [0.0; LAUNCHER_FRIC_NUM];
        for (i, (fric, sign)) in self.fric.iter_mut().zip([1.0, -1.0]).enumerate() {
            let speed = ActuatorFeedback::speed(fb.fric[i].rotor_speed);
            fric_cur[i] = fric.calculate(sign * target, &speed, dt);
        }

        let trig_fb = ActuatorFeedback::cascade(
            self.trig_angle,
            rpm_to_rad_s(fb.trig.rotor_speed) / self.trig_gear_ratio,
        );
        let trig_cur = self.trig.calculate(self.trig_setpoint, &trig_fb, dt);

        LauncherOutput {
            fric_cur,
            trig_cur,
            cover_duty,
        }
    }

    pub fn ui(&self) -> LauncherUi {
        LauncherUi {
            fire_mode: self.fire_mode,
            cover_open: self.cover_open,
            shots: self.shots,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
