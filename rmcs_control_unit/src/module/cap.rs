//! Super-capacitor power controller.
//!
//! Two states, `Online` and `Offline`, switched only by feedback liveness:
//! the capacitor task calls [`CapController::update`] + [`CapController::control`]
//! when a sample arrived within the timeout and [`CapController::handle_offline`]
//! when it did not. Offline output is the fixed without-capacitor ceiling.
//!
//! Online output is the referee chassis power limit corrected by a
//! buffer-energy loop: when the referee buffer drains below its target the
//! request drops so the chassis refills it.

use rmcs_common::consts::GAME_CHASSIS_MAX_POWER_WO_REF;
use rmcs_common::msg::{CapFeedback, CapOutput, CapState, CapUi, RefereeForCap};
use tracing::{info, warn};

use crate::config::CapConfig;
use crate::control::actuator::{Actuator, ActuatorFeedback};
use crate::error::ControlError;

/// Usable stored energy in `[0, 1]` for a bank at `volt`.
///
/// Energy scales with V², and everything below `cutoff` is unusable.
pub fn energy_percentage(volt: f64, cutoff: f64, full: f64) -> f64 {
    let span = full * full - cutoff * cutoff;
    let pct = (volt * volt - cutoff * cutoff) / span;
    if pct.is_finite() {
        pct.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct CapController {
    cutoff_volt: f64,
    full_volt: f64,
    buffer_target: f64,
    buffer: Actuator,
    state: CapState,
    /// At least one feedback sample seen since start.
    seen: bool,
}

impl CapController {
    /// Build the controller for a task running at `sample_freq` [Hz].
    pub fn new(config: &CapConfig, sample_freq: f64) -> Result<Self, ControlError> {
        Ok(Self {
            cutoff_volt: config.cutoff_volt,
            full_volt: config.full_volt,
            buffer_target: config.buffer_target,
            buffer: Actuator::new(&config.buffer, sample_freq)?,
            state: CapState::default(),
            seen: false,
        })
    }

    /// Fold in a fresh feedback sample. Brings the controller online.
    pub fn update(&mut self, feedback: &CapFeedback) {
        if !self.state.is_online {
            if self.seen {
                info!(volt = feedback.cap_volt, "capacitor feedback restored, online");
            } else {
                info!(volt = feedback.cap_volt, "capacitor online");
            }
            self.buffer.reset(self.buffer_target);
        }
        self.seen = true;
        self.state.is_online = true;
        if feedback.cap_volt.is_finite() {
            self.state.voltage = feedback.cap_volt;
        }
        self.state.remaining_energy_pct =
            energy_percentage(self.state.voltage, self.cutoff_volt, self.full_volt);
    }

    /// Online output from the referee budget and the current state.
    pub fn control(&mut self, referee: &RefereeForCap, dt: f64) -> CapOutput {
        if !self.state.is_online {
            return self.degraded_output(GAME_CHASSIS_MAX_POWER_WO_REF);
        }
        let requested_power = if referee.online {
            let correction = self.buffer.calculate(
                self.buffer_target,
                &ActuatorFeedback::speed(referee.chassis_power_buffer),
                dt,
            );
            (referee.chassis_power_limit - correction).max(0.0)
        } else {
            GAME_CHASSIS_MAX_POWER_WO_REF
        };
        CapOutput { requested_power }
    }

    /// Feedback timed out: go offline and output the fixed `ceiling`.
    pub fn handle_offline(&mut self, ceiling: f64) -> CapOutput {
        if self.state.is_online {
            warn!(ceiling, "capacitor feedback timeout, offline");
        }
        self.state.is_online = false;
        self.state.remaining_energy_pct = 0.0;
        self.degraded_output(ceiling)
    }

    fn degraded_output(&self, ceiling: f64) -> CapOutput {
        CapOutput {
            requested_power: ceiling,
        }
    }

    #[inline]
    pub fn state(&self) -> CapState {
        self.state
    }

    #[inline]
    pub fn is_online(&self) -> bool {
        self.state.is_online
    }

    pub fn ui(&self) -> CapUi {
        CapUi {
            percentage: self.state.remaining_energy_pct,
            online: self.state.is_online,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
