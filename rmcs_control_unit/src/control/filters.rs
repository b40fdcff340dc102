//! Second-order (biquad) signal conditioning filters.
//!
//! Butterworth 2-pole low-pass and constant-bandwidth notch, both derived by
//! bilinear transform and evaluated in Direct Form II. A non-positive cutoff
//! or notch frequency yields the identity filter.
//!
//! ```text
//! H(z) = (b0 + b1·z⁻¹ + b2·z⁻²) / (1 + a1·z⁻¹ + a2·z⁻²)
//! ```

use core::f64::consts::{FRAC_PI_4, PI};

use crate::error::ControlError;

/// Biquad coefficients plus Direct-Form-II delay line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    delay_1: f64,
    delay_2: f64,
    /// Last finite output, held when a sample cannot be computed.
    last_output: f64,
}

impl Default for Biquad {
    fn default() -> Self {
        Self::identity()
    }
}

impl Biquad {
    /// Pass-through filter: `b0 = 1`, everything else zero.
    pub const fn identity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            delay_1: 0.0,
            delay_2: 0.0,
            last_output: 0.0,
        }
    }

    /// Butterworth low-pass at `cutoff_freq` for a loop sampled at `sample_freq`.
    ///
    /// # Errors
    ///
    /// `InvalidFrequency` if the filter is enabled and `sample_freq` is not
    /// positive, or `cutoff_freq` is at or above Nyquist.
    pub fn low_pass(sample_freq: f64, cutoff_freq: f64) -> Result<Self, ControlError> {
        if cutoff_freq.is_nan() || cutoff_freq <= 0.0 {
            return Ok(Self::identity());
        }
        check_band(sample_freq, cutoff_freq)?;

        let fr = sample_freq / cutoff_freq;
        let ohm = (PI / fr).tan();
        let ohm2 = ohm * ohm;
        let k = 2.0 * FRAC_PI_4.cos() * ohm;
        let c = 1.0 + k + ohm2;

        let b0 = ohm2 / c;
        Ok(Self {
            b0,
            b1: 2.0 * b0,
            b2: b0,
            a1: 2.0 * (ohm2 - 1.0) / c,
            a2: (1.0 - k + ohm2) / c,
            ..Self::identity()
        })
    }

    /// Notch at `notch_freq` with `bandwidth` [Hz].
    ///
    /// A non-positive bandwidth defaults to 10 % of the notch frequency.
    ///
    /// # Errors
    ///
    /// Same frequency rules as [`Biquad::low_pass`], applied to both the
    /// notch frequency and the bandwidth.
    pub fn notch(sample_freq: f64, notch_freq: f64, bandwidth: f64) -> Result<Self, ControlError> {
        if notch_freq.is_nan() || notch_freq <= 0.0 {
            return Ok(Self::identity());
        }
        check_band(sample_freq, notch_freq)?;

        let bw = if bandwidth > 0.0 { bandwidth } else { notch_freq * 0.1 };
        check_band(sample_freq, bw)?;
        let alpha = (PI * bw / sample_freq).tan();
        let beta = -(2.0 * PI * notch_freq / sample_freq).cos();
        let a0_inv = 1.0 / (1.0 + alpha);

        let b1 = 2.0 * beta * a0_inv;
        Ok(Self {
            b0: a0_inv,
            b1,
            b2: a0_inv,
            a1: b1,
            a2: (1.0 - alpha) * a0_inv,
            ..Self::identity()
        })
    }

    /// True for the pass-through filter.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.b0 == 1.0 && self.b1 == 0.0 && self.b2 == 0.0 && self.a1 == 0.0 && self.a2 == 0.0
    }

    /// Filter one sample.
    ///
    /// A non-finite intermediate drops the feedback terms for this sample
    /// (the raw input is used instead). A non-finite output returns the last
    /// finite output.
    #[inline]
    pub fn apply(&mut self, sample: f64) -> f64 {
        let mut d0 = sample - self.delay_1 * self.a1 - self.delay_2 * self.a2;
        if !d0.is_finite() {
            d0 = sample;
        }

        let output = d0 * self.b0 + self.delay_1 * self.b1 + self.delay_2 * self.b2;

        self.delay_2 = self.delay_1;
        self.delay_1 = d0;

        if output.is_finite() {
            self.last_output = output;
        }
        self.last_output
    }

    /// Seed the delay line so a constant `sample` passes through unchanged,
    /// then filter it once.
    pub fn reset(&mut self, sample: f64) -> f64 {
        let mut dval = sample / (self.b0 + self.b1 + self.b2);
        if !dval.is_finite() {
            dval = sample;
        }
        self.delay_1 = dval;
        self.delay_2 = dval;
        if sample.is_finite() {
            self.last_output = sample;
        }
        self.apply(sample)
    }
}

fn check_band(sample_freq: f64, freq: f64) -> Result<(), ControlError> {
    if !sample_freq.is_finite() || sample_freq <= 0.0 {
        return Err(ControlError::InvalidFrequency(format!(
            "sample frequency {sample_freq} must be positive"
        )));
    }
    if freq >= sample_freq / 2.0 {
        return Err(ControlError::InvalidFrequency(format!(
            "{freq} Hz is at or above Nyquist for {sample_freq} Hz sampling"
        )));
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────
