//! PID controller with cyclic error wrap, clamped integral and optional
//! derivative low-pass.
//!
//! Output is `k * (p·e + i·∫e + d·ė)` saturated to `±out_limit`. The integral
//! accumulates `e·dt` every step and is clamped to `±i_limit` afterwards; it is
//! never frozen on saturation.

use rmcs_common::control::PidParams;

use crate::control::filters::Biquad;
use crate::error::ControlError;

/// Shortest signed distance from `feedback` to `setpoint` around `period`.
///
/// Result lies in `[-period/2, period/2]`.
#[inline]
pub fn cyclic_error(setpoint: f64, feedback: f64, period: f64) -> f64 {
    let half = period / 2.0;
    (setpoint - feedback + half).rem_euclid(period) - half
}

/// One PID loop.
#[derive(Debug, Clone)]
pub struct Pid {
    params: PidParams,
    /// Integral accumulator, always within `±i_limit`.
    integral: f64,
    prev_error: f64,
    /// False until the first step after construction or reset.
    primed: bool,
    d_filter: Biquad,
}

impl Pid {
    /// Build a loop running at `sample_freq` [Hz].
    ///
    /// # Errors
    ///
    /// Negative or non-finite gains, a negative `i_limit`, a non-positive
    /// `out_limit`, a non-positive wrap period or an invalid derivative cutoff.
    pub fn new(params: &PidParams, sample_freq: f64) -> Result<Self, ControlError> {
        validate(params)?;
        let d_filter = Biquad::low_pass(sample_freq, params.d_cutoff_freq)?;
        Ok(Self {
            params: *params,
            integral: 0.0,
            prev_error: 0.0,
            primed: false,
            d_filter,
        })
    }

    /// Parameters this loop was built from.
    #[inline]
    pub fn params(&self) -> &PidParams {
        &self.params
    }

    /// Current integral accumulator.
    #[inline]
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Output saturation bound.
    #[inline]
    pub fn out_limit(&self) -> f64 {
        self.params.out_limit
    }

    /// Control error for this loop (wrapped when cyclic).
    #[inline]
    pub fn error(&self, setpoint: f64, feedback: f64) -> f64 {
        if self.params.cycle {
            cyclic_error(setpoint, feedback, self.params.period)
        } else {
            setpoint - feedback
        }
    }

    /// Run one step; the derivative is taken from the error difference.
    pub fn step(&mut self, setpoint: f64, feedback: f64, dt: f64) -> f64 {
        let err = self.error(setpoint, feedback);
        if dt <= 0.0 || !err.is_finite() {
            return 0.0;
        }

        let raw_derivative = if self.primed {
            (err - self.prev_error) / dt
        } else {
            0.0
        };
        self.finish(err, raw_derivative, dt)
    }

    /// Run one step with the derivative taken from a measured feedback rate
    /// (`ė = -feedback_rate`), e.g. a gyro on an angle loop.
    pub fn step_with_rate(&mut self, setpoint: f64, feedback: f64, feedback_rate: f64, dt: f64) -> f64 {
        let err = self.error(setpoint, feedback);
        if dt <= 0.0 || !err.is_finite() {
            return 0.0;
        }
        let raw_derivative = if feedback_rate.is_finite() {
            -feedback_rate
        } else {
            0.0
        };
        self.finish(err, raw_derivative, dt)
    }

    fn finish(&mut self, err: f64, raw_derivative: f64, dt: f64) -> f64 {
        let p = &self.params;

        self.integral = (self.integral + err * dt).clamp(-p.i_limit, p.i_limit);

        let derivative = self.d_filter.apply(raw_derivative);

        self.prev_error = err;
        self.primed = true;

        let out = p.k * (p.p * err + p.i * self.integral + p.d * derivative);
        out.clamp(-p.out_limit, p.out_limit)
    }

    /// Clear integral and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
        self.primed = false;
        self.d_filter.reset(0.0);
    }
}

fn validate(p: &PidParams) -> Result<(), ControlError> {
    for (name, value) in [("k", p.k), ("p", p.p), ("i", p.i), ("d", p.d)] {
        if !value.is_finite() || value < 0.0 {
            return Err(ControlError::InvalidGain { name, value });
        }
    }
    if !p.i_limit.is_finite() || p.i_limit < 0.0 {
        return Err(ControlError::InvalidLimit {
            name: "i_limit",
            value: p.i_limit,
        });
    }
    if !p.out_limit.is_finite() || p.out_limit <= 0.0 {
        return Err(ControlError::InvalidLimit {
            name: "out_limit",
            value: p.out_limit,
        });
    }
    if p.cycle && (!p.period.is_finite() || p.period <= 0.0) {
        return Err(ControlError::InvalidPeriod(p.period));
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::{PI, TAU};
    use proptest::prelude::*;

    const FREQ: f64 = 1000.0;
    const DT: f64 = 1.0 / FREQ;

    fn params() -> PidParams {
        PidParams::proportional(1.0, 100.0)
    }

    #[test]
    fn pure_proportional() {
        let mut pid = Pid::new(&PidParams::proportional(10.0, 100.0), FREQ).unwrap();
        assert!((pid.step(1.0, 0.0, DT) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn overall_gain_scales_output() {
        let p = PidParams { k: 0.5, ..PidParams::proportional(4.0, 100.0) };
        let mut pid = Pid::new(&p, FREQ).unwrap();
        assert!((pid.step(1.0, 0.0, DT) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn output_is_saturated() {
        let mut pid = Pid::new(&PidParams::proportional(10.0, 3.0), FREQ).unwrap();
        assert_eq!(pid.step(100.0, 0.0, DT), 3.0);
        assert_eq!(pid.step(-100.0, 0.0, DT), -3.0);
    }

    #[test]
    fn integral_accumulates_error_dt() {
        let p = PidParams { p: 0.0, i: 1.0, i_limit: 10.0, ..params() };
        let mut pid = Pid::new(&p, FREQ).unwrap();
        for _ in 0..10 {
            pid.step(1.0, 0.0, DT);
        }
        assert!((pid.integral() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn integral_clamped_after_accumulation() {
        let p = PidParams { p: 0.0, i: 1.0, i_limit: 0.005, ..params() };
        let mut pid = Pid::new(&p, FREQ).unwrap();
        for _ in 0..100 {
            pid.step(1.0, 0.0, DT);
        }
        assert_eq!(pid.integral(), 0.005);
        // Unwinds immediately once the error reverses.
        pid.step(-1.0, 0.0, DT);
        assert!((pid.integral() - 0.004).abs() < 1e-12);
    }

    #[test]
    fn first_derivative_after_reset_is_zero() {
        let p = PidParams { p: 0.0, d: 1.0, ..params() };
        let mut pid = Pid::new(&p, FREQ).unwrap();
        assert_eq!(pid.step(1.0, 0.0, DT), 0.0);
        // error 1 → 1.05: derivative 50
        assert!((pid.step(1.05, 0.0, DT) - 50.0).abs() < 1e-9);
        pid.reset();
        assert_eq!(pid.step(5.0, 0.0, DT), 0.0);
    }

    #[test]
    fn derivative_on_measurement() {
        let p = PidParams { p: 0.0, d: 2.0, ..params() };
        let mut pid = Pid::new(&p, FREQ).unwrap();
        assert!((pid.step_with_rate(0.0, 0.0, 3.0, DT) + 6.0).abs() < 1e-12);
    }

    #[test]
    fn filtered_derivative_is_smoother() {
        let raw = PidParams { p: 0.0, d: 1.0, ..params() };
        let filtered = PidParams { d_cutoff_freq: 20.0, ..raw };
        let mut a = Pid::new(&raw, FREQ).unwrap();
        let mut b = Pid::new(&filtered, FREQ).unwrap();
        a.step(0.0, 0.0, DT);
        b.step(0.0, 0.0, DT);
        let step_raw = a.step(0.05, 0.0, DT);
        let step_filtered = b.step(0.05, 0.0, DT);
        assert!(step_filtered.abs() < step_raw.abs());
    }

    #[test]
    fn cyclic_error_takes_short_way() {
        let p = PidParams { cycle: true, ..params() };
        let pid = Pid::new(&p, FREQ).unwrap();
        let e = pid.error(3.0, -3.0);
        assert!((e - (6.0 - TAU)).abs() < 1e-12);
        assert!((pid.error(3.0, -3.0 + TAU) - e).abs() < 1e-12);
    }

    #[test]
    fn non_positive_dt_yields_zero() {
        let mut pid = Pid::new(&params(), FREQ).unwrap();
        assert_eq!(pid.step(1.0, 0.0, 0.0), 0.0);
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn non_finite_feedback_yields_zero() {
        let p = PidParams { i: 1.0, i_limit: 1.0, ..params() };
        let mut pid = Pid::new(&p, FREQ).unwrap();
        assert_eq!(pid.step(1.0, f64::NAN, DT), 0.0);
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn rejects_malformed_params() {
        let negative_gain = PidParams { p: -1.0, ..params() };
        assert!(matches!(
            Pid::new(&negative_gain, FREQ),
            Err(ControlError::InvalidGain { name: "p", .. })
        ));

        let zero_out = PidParams { out_limit: 0.0, ..params() };
        assert!(matches!(
            Pid::new(&zero_out, FREQ),
            Err(ControlError::InvalidLimit { name: "out_limit", .. })
        ));

        let negative_i_limit = PidParams { i_limit: -0.1, ..params() };
        assert!(Pid::new(&negative_i_limit, FREQ).is_err());

        let bad_period = PidParams { cycle: true, period: 0.0, ..params() };
        assert!(matches!(
            Pid::new(&bad_period, FREQ),
            Err(ControlError::InvalidPeriod(_))
        ));

        let bad_cutoff = PidParams { d_cutoff_freq: 600.0, ..params() };
        assert!(matches!(
            Pid::new(&bad_cutoff, FREQ),
            Err(ControlError::InvalidFrequency(_))
        ));
    }

    proptest! {
        #[test]
        fn cyclic_error_is_bounded_and_periodic(
            sp in -100.0f64..100.0,
            fb in -100.0f64..100.0,
            turns in -5i32..5,
        ) {
            let e = cyclic_error(sp, fb, TAU);
            prop_assert!(e.abs() <= PI + 1e-9);
            let shifted = cyclic_error(sp, fb + f64::from(turns) * TAU, TAU);
            let diff = cyclic_error(e, shifted, TAU);
            prop_assert!(diff.abs() < 1e-9);
        }

        #[test]
        fn integral_never_exceeds_limit(
            errors in prop::collection::vec(-1e3f64..1e3, 1..200),
            i_limit in 0.0f64..5.0,
        ) {
            let p = PidParams { i: 1.0, i_limit, ..params() };
            let mut pid = Pid::new(&p, FREQ).unwrap();
            for e in errors {
                pid.step(e, 0.0, DT);
                prop_assert!(pid.integral().abs() <= i_limit);
            }
        }

        #[test]
        fn output_never_exceeds_limit(
            sp in -1e3f64..1e3,
            fb in -1e3f64..1e3,
            out_limit in 0.1f64..50.0,
        ) {
            let p = PidParams { p: 5.0, i: 2.0, d: 0.1, i_limit: 10.0, ..PidParams::proportional(5.0, out_limit) };
            let mut pid = Pid::new(&p, FREQ).unwrap();
            for _ in 0..5 {
                prop_assert!(pid.step(sp, fb, DT).abs() <= out_limit);
            }
        }
    }
}
