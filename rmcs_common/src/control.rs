//! Control-law parameter tables.
//!
//! Plain data consumed by the control unit's PID and actuator components.
//! A non-positive filter frequency means "filter disabled" throughout.

use serde::{Deserialize, Serialize};

/// Period used for cyclic (angular) errors when none is configured [rad].
pub const DEFAULT_CYCLE_PERIOD: f64 = core::f64::consts::TAU;

/// Single PID loop parameters.
///
/// Output is `k * (p*e + i*∫e + d*ė)` clamped to `±out_limit`; the integral
/// is clamped to `±i_limit` after every accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidParams {
    /// Overall gain applied to the sum of the three terms.
    #[serde(default = "default_k")]
    pub k: f64,
    /// Proportional gain.
    #[serde(default)]
    pub p: f64,
    /// Integral gain.
    #[serde(default)]
    pub i: f64,
    /// Derivative gain.
    #[serde(default)]
    pub d: f64,
    /// Integral accumulator bound.
    #[serde(default)]
    pub i_limit: f64,
    /// Output bound; must be positive.
    pub out_limit: f64,
    /// Derivative low-pass cutoff [Hz] (≤ 0 = unfiltered).
    #[serde(default = "disabled_freq")]
    pub d_cutoff_freq: f64,
    /// Wrap the error to the shortest signed distance around `period`.
    #[serde(default)]
    pub cycle: bool,
    /// Wrap period for cyclic errors.
    #[serde(default = "default_period")]
    pub period: f64,
}

fn default_k() -> f64 {
    1.0
}

fn disabled_freq() -> f64 {
    -1.0
}

fn default_period() -> f64 {
    DEFAULT_CYCLE_PERIOD
}

impl PidParams {
    /// Proportional-only loop with unit overall gain.
    pub const fn proportional(p: f64, out_limit: f64) -> Self {
        Self {
            k: 1.0,
            p,
            i: 0.0,
            d: 0.0,
            i_limit: 0.0,
            out_limit,
            d_cutoff_freq: -1.0,
            cycle: false,
            period: DEFAULT_CYCLE_PERIOD,
        }
    }
}

/// Actuator parameters: a speed loop, optionally cascaded under a position loop.
///
/// `position = None` is a speed actuator; `Some` makes the position loop's
/// output the speed loop's setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatorParams {
    /// Inner (speed) loop.
    pub speed: PidParams,
    /// Outer (position) loop.
    #[serde(default)]
    pub position: Option<PidParams>,
    /// Setpoint low-pass cutoff [Hz] (≤ 0 = disabled).
    #[serde(default = "disabled_freq")]
    pub in_cutoff_freq: f64,
    /// Output low-pass cutoff [Hz] (≤ 0 = disabled).
    #[serde(default = "disabled_freq")]
    pub out_cutoff_freq: f64,
}

impl ActuatorParams {
    /// Speed-only actuator without conditioning filters.
    pub const fn speed(speed: PidParams) -> Self {
        Self {
            speed,
            position: None,
            in_cutoff_freq: -1.0,
            out_cutoff_freq: -1.0,
        }
    }

    /// Position → speed cascade without conditioning filters.
    pub const fn cascade(position: PidParams, speed: PidParams) -> Self {
        Self {
            speed,
            position: Some(position),
            in_cutoff_freq: -1.0,
            out_cutoff_freq: -1.0,
        }
    }

    /// True when a position loop feeds the speed loop.
    #[inline]
    pub const fn is_cascade(&self) -> bool {
        self.position.is_some()
    }
}
