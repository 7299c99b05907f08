//! Parameter and introspection types for the PI velocity controller.
//!
//! Defines `VelocityControlParameters` (the `[controller]` TOML section),
//! `ClockResolution` and the fixed-size `VelocitySnapshot`.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use crate::config::ConfigError;
use crate::consts::{DEFAULT_EFFORT_MAX, DEFAULT_EFFORT_MIN, MICROS_PER_SECOND, MILLIS_PER_SECOND};

/// Tick resolution of the monotonic clock feeding the controller.
///
/// One tick is also the minimum `dt` the controller will integrate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClockResolution {
    /// 1 ms ticks.
    #[default]
    Millis,
    /// 1 µs ticks.
    Micros,
}

impl ClockResolution {
    /// Number of ticks in one second.
    #[inline]
    pub const fn ticks_per_second(self) -> u64 {
        match self {
            Self::Millis => MILLIS_PER_SECOND,
            Self::Micros => MICROS_PER_SECOND,
        }
    }
}

/// Tuning parameters of a PI velocity controller.
///
/// Zero `ki` disables the integral contribution to the output; the
/// integrator still accumulates so a later gain change sees the history.
///
/// # TOML Example
///
/// ```toml
/// [controller]
/// kp = 2.0
/// ki = 0.5
/// setpoint = 10.0
/// effort_min = -100.0
/// effort_max = 100.0
/// clock_resolution = "millis"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VelocityControlParameters {
    /// Proportional gain.
    #[serde(default)]
    pub kp: f64,
    /// Integral gain.
    #[serde(default)]
    pub ki: f64,
    /// Target velocity [rad/s].
    #[serde(default)]
    pub setpoint: f64,
    /// Lower effort bound.
    #[serde(default = "default_effort_min")]
    pub effort_min: f64,
    /// Upper effort bound.
    #[serde(default = "default_effort_max")]
    pub effort_max: f64,
    /// Clock tick resolution.
    #[serde(default)]
    pub clock_resolution: ClockResolution,
}

fn default_effort_min() -> f64 {
    DEFAULT_EFFORT_MIN
}

fn default_effort_max() -> f64 {
    DEFAULT_EFFORT_MAX
}

impl Default for VelocityControlParameters {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            setpoint: 0.0,
            effort_min: DEFAULT_EFFORT_MIN,
            effort_max: DEFAULT_EFFORT_MAX,
            clock_resolution: ClockResolution::Millis,
        }
    }
}

impl VelocityControlParameters {
    /// Validate the parameters.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if any value is non-finite or
    /// `effort_min > effort_max`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite("controller.kp", self.kp)?;
        ensure_finite("controller.ki", self.ki)?;
        ensure_finite("controller.setpoint", self.setpoint)?;
        ensure_finite("controller.effort_min", self.effort_min)?;
        ensure_finite("controller.effort_max", self.effort_max)?;
        if self.effort_min > self.effort_max {
            return Err(ConfigError::ValidationError(format!(
                "controller.effort_min ({}) exceeds controller.effort_max ({})",
                self.effort_min, self.effort_max
            )));
        }
        Ok(())
    }
}

/// Reject NaN and infinities for a named configuration value.
pub fn ensure_finite(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

/// Point-in-time copy of the controller state (5 × f64 = 40 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C)]
pub struct VelocitySnapshot {
    /// Proportional gain in effect.
    pub kp: f64,
    /// Integral gain in effect.
    pub ki: f64,
    /// Target velocity [rad/s].
    pub setpoint: f64,
    /// Accumulated error·time [rad].
    pub integrator: f64,
    /// Last returned effort.
    pub output: f64,
}

const_assert_eq!(core::mem::size_of::<VelocitySnapshot>(), 40);

impl VelocitySnapshot {
    /// Returns true if all fields are finite (not NaN, not Inf).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.kp.is_finite()
            && self.ki.is_finite()
            && self.setpoint.is_finite()
            && self.integrator.is_finite()
            && self.output.is_finite()
    }
}
