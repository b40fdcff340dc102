//! Actuator: a speed loop, optionally under a position loop, with setpoint
//! and output conditioning filters.
//!
//! ```text
//! setpoint ─▶ in_filter ─▶ [position PID] ─▶ speed PID ─▶ out_filter ─▶ clamp
//! ```
//!
//! The result always lies in `±out_limit` of the speed (innermost) loop.

use rmcs_common::control::ActuatorParams;

use crate::control::filters::Biquad;
use crate::control::pid::Pid;
use crate::error::ControlError;

/// Measured state for one actuator step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActuatorFeedback {
    /// Position loop feedback (ignored by speed-only actuators).
    pub position: f64,
    /// Speed loop feedback.
    pub speed: f64,
    /// Position rate in position units per second. When present the
    /// position loop takes its derivative from it instead of the error.
    pub position_rate: Option<f64>,
}

impl ActuatorFeedback {
    /// Feedback for a speed-only actuator.
    #[inline]
    pub const fn speed(speed: f64) -> Self {
        Self {
            position: 0.0,
            speed,
            position_rate: None,
        }
    }

    /// Feedback for a cascade.
    #[inline]
    pub const fn cascade(position: f64, speed: f64) -> Self {
        Self {
            position,
            speed,
            position_rate: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Actuator {
    position: Option<Pid>,
    speed: Pid,
    in_filter: Biquad,
    out_filter: Biquad,
}

impl Actuator {
    /// Build an actuator stepped at `sample_freq` [Hz].
    ///
    /// # Errors
    ///
    /// Any loop or filter parameter fault.
    pub fn new(params: &ActuatorParams, sample_freq: f64) -> Result<Self, ControlError> {
        let position = params
            .position
            .as_ref()
            .map(|p| Pid::new(p, sample_freq))
            .transpose()?;
        Ok(Self {
            position,
            speed: Pid::new(&params.speed, sample_freq)?,
            in_filter: Biquad::low_pass(sample_freq, params.in_cutoff_freq)?,
            out_filter: Biquad::low_pass(sample_freq, params.out_cutoff_freq)?,
        })
    }

    /// True when a position loop feeds the speed loop.
    #[inline]
    pub fn is_cascade(&self) -> bool {
        self.position.is_some()
    }

    /// Output bound of the innermost loop.
    #[inline]
    pub fn out_limit(&self) -> f64 {
        self.speed.out_limit()
    }

    /// Run one control step and return the saturated command.
    pub fn calculate(&mut self, setpoint: f64, feedback: &ActuatorFeedback, dt: f64) -> f64 {
        let setpoint = self.in_filter.apply(setpoint);

        let speed_setpoint = match self.position.as_mut() {
            Some(pos) => match feedback.position_rate {
                Some(rate) => pos.step_with_rate(setpoint, feedback.position, rate, dt),
                None => pos.step(setpoint, feedback.position, dt),
            },
            None => setpoint,
        };

        let out = self.speed.step(speed_setpoint, feedback.speed, dt);
        let limit = self.speed.out_limit();
        self.out_filter.apply(out).clamp(-limit, limit)
    }

    /// Clear loop history and seed the setpoint filter with `setpoint`.
    pub fn reset(&mut self, setpoint: f64) {
        if let Some(pos) = self.position.as_mut() {
            pos.reset();
        }
        self.speed.reset();
        self.in_filter.reset(setpoint);
        self.out_filter.reset(0.0);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rmcs_common::control::PidParams;

    const FREQ: f64 = 500.0;
    const DT: f64 = 1.0 / FREQ;

    fn speed_params() -> PidParams {
        PidParams {
            i: 5.0,
            i_limit: 1.0,
            ..PidParams::proportional(2.0, 1.0)
        }
    }

    #[test]
    fn speed_actuator_tracks_first_order_plant() {
        let mut act = Actuator::new(&ActuatorParams::speed(speed_params()), FREQ).unwrap();
        assert!(!act.is_cascade());

        // Plant: speed' = 20 * (u - 0.05 * speed)
        let mut speed = 0.0;
        for _ in 0..5000 {
            let u = act.calculate(10.0, &ActuatorFeedback::speed(speed), DT);
            speed += 20.0 * (u - 0.05 * speed) * DT;
        }
        assert!((speed - 10.0).abs() < 0.5, "speed settled at {speed}");
    }

    #[test]
    fn cascade_output_bounded_by_inner_limit() {
        let params = ActuatorParams::cascade(PidParams::proportional(50.0, 100.0), speed_params());
        let mut act = Actuator::new(&params, FREQ).unwrap();
        assert!(act.is_cascade());
        for _ in 0..100 {
            let out = act.calculate(1000.0, &ActuatorFeedback::cascade(0.0, 0.0), DT);
            assert!(out.abs() <= act.out_limit());
        }
    }

    #[test]
    fn output_filter_result_is_reclamped() {
        let params = ActuatorParams {
            out_cutoff_freq: 50.0,
            ..ActuatorParams::speed(PidParams::proportional(100.0, 1.0))
        };
        let mut act = Actuator::new(&params, FREQ).unwrap();
        let mut sign = 1.0;
        for _ in 0..200 {
            sign = -sign;
            let out = act.calculate(sign * 100.0, &ActuatorFeedback::speed(0.0), DT);
            assert!(out.abs() <= 1.0);
        }
    }

    #[test]
    fn cascade_uses_position_rate_when_given() {
        let position = PidParams {
            d: 1.0,
            ..PidParams::proportional(0.0, 100.0)
        };
        let params = ActuatorParams::cascade(position, PidParams::proportional(1.0, 100.0));
        let mut act = Actuator::new(&params, FREQ).unwrap();
        let fb = ActuatorFeedback {
            position: 0.0,
            speed: 0.0,
            position_rate: Some(2.0),
        };
        // Position loop outputs -d·rate = -2; speed loop P=1 forwards it.
        assert!((act.calculate(0.0, &fb, DT) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn reset_seeds_setpoint_filter() {
        let params = ActuatorParams {
            in_cutoff_freq: 5.0,
            ..ActuatorParams::speed(PidParams::proportional(1.0, 100.0))
        };
        let mut act = Actuator::new(&params, FREQ).unwrap();
        act.reset(4.0);
        // Seeded filter passes the constant setpoint straight through.
        let out = act.calculate(4.0, &ActuatorFeedback::speed(0.0), DT);
        assert!((out - 4.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_bad_filter_cutoff() {
        let params = ActuatorParams {
            in_cutoff_freq: 400.0,
            ..ActuatorParams::speed(speed_params())
        };
        assert!(matches!(
            Actuator::new(&params, FREQ),
            Err(ControlError::InvalidFrequency(_))
        ));
    }
}
