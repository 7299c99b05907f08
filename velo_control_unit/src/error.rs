//! Error types for the control unit.
//!
//! `ControlError` covers rejected controller inputs; `CycleError` is what
//! the cycle loop and the binary propagate.

use thiserror::Error;
use velo_common::config::ConfigError;

/// Rejected controller construction or mutation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ControlError {
    /// A gain, setpoint or limit was NaN or infinite.
    #[error("{name} must be finite, got {value}")]
    NonFinite {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Effort limits are non-finite or out of order.
    #[error("invalid effort limits: min {min} > max {max} or non-finite")]
    InvalidLimits {
        /// Requested lower bound.
        min: f64,
        /// Requested upper bound.
        max: f64,
    },
}

/// Cycle loop error.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Configuration could not be loaded or validated.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// Controller rejected its parameters.
    #[error("controller: {0}")]
    Control(#[from] ControlError),

    /// Clock or scheduler setup failed.
    #[error("RT setup failed: {0}")]
    RtSetup(String),

    /// A cycle took longer than its budget (rt builds only).
    #[error("cycle overrun: {actual_ns} ns > {budget_ns} ns budget")]
    CycleOverrun {
        /// Measured cycle duration [ns].
        actual_ns: i64,
        /// Configured cycle time [ns].
        budget_ns: i64,
    },
}

/// Check that a named controller input is finite.
#[inline]
pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64, ControlError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ControlError::NonFinite { name, value })
    }
}
