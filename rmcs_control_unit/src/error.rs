//! Construction-time error taxonomy.
//!
//! Every component validates its parameters when it is built and returns a
//! [`ControlError`] on a malformed table. Nothing on the control path returns
//! an error: runtime anomalies are state (offline flags, held filter outputs,
//! Relax modes), never `Err`.

use rmcs_common::config::ConfigError;
use thiserror::Error;

/// Fault detected while building a component from its parameters.
#[derive(Debug, Clone, Error)]
pub enum ControlError {
    /// A PID gain is negative or not finite.
    #[error("invalid gain {name} = {value}")]
    InvalidGain { name: &'static str, value: f64 },

    /// A saturation bound is out of range (`out_limit` must be positive).
    #[error("invalid limit {name} = {value}")]
    InvalidLimit { name: &'static str, value: f64 },

    /// A filter or sample frequency is inconsistent.
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    /// A cyclic error period is not positive.
    #[error("invalid cycle period {0}")]
    InvalidPeriod(f64),

    /// An event map has no entry for loss of control.
    #[error("{module} event map has no lost_ctrl entry")]
    MissingLostCtrl { module: &'static str },

    /// An event map routes loss of control to something other than Relax.
    #[error("{module} event map maps lost_ctrl to a non-relax action")]
    LostCtrlNotRelax { module: &'static str },

    /// An event map exceeds its fixed capacity.
    #[error("{module} event map has {len} entries (capacity {cap})")]
    EventMapFull {
        module: &'static str,
        len: usize,
        cap: usize,
    },

    /// Configuration file could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
