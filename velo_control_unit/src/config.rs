//! TOML configuration for the control unit binary.
//!
//! One file, four sections:
//!
//! ```toml
//! [shared]
//! service_name = "velo-left-wheel"
//!
//! [controller]
//! kp = 2.0
//! ki = 0.5
//! setpoint = 10.0
//!
//! [cycle]
//! cycle_time_us = 10000
//! max_cycles = 500
//!
//! [motor]
//! gain = 0.5
//! time_constant = 0.1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use velo_common::config::{ConfigError, ConfigLoader, SharedConfig};
use velo_common::consts::{DEFAULT_CYCLE_TIME_US, DEFAULT_MAX_CYCLES};
use velo_common::control::{VelocityControlParameters, ensure_finite};

/// Cycle loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CycleConfig {
    /// Cycle period [µs].
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,
    /// Number of cycles to execute before returning.
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u64,
}

fn default_cycle_time_us() -> u32 {
    DEFAULT_CYCLE_TIME_US
}

fn default_max_cycles() -> u64 {
    DEFAULT_MAX_CYCLES
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_time_us: DEFAULT_CYCLE_TIME_US,
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }
}

impl CycleConfig {
    /// Cycle period [ns].
    #[inline]
    pub fn cycle_time_ns(&self) -> i64 {
        self.cycle_time_us as i64 * 1000
    }

    /// Cycle period [s].
    #[inline]
    pub fn cycle_time_s(&self) -> f64 {
        self.cycle_time_us as f64 * 1e-6
    }

    /// Validate the section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `cycle_time_us` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_time_us == 0 {
            return Err(ConfigError::ValidationError(
                "cycle.cycle_time_us must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// First-order motor model driven by the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotorModelConfig {
    /// Steady-state velocity per unit effort [rad/s per %].
    pub gain: f64,
    /// Mechanical time constant [s].
    pub time_constant: f64,
    /// Velocity at start [rad/s].
    #[serde(default)]
    pub initial_velocity: f64,
}

impl Default for MotorModelConfig {
    fn default() -> Self {
        Self {
            gain: 0.5,
            time_constant: 0.1,
            initial_velocity: 0.0,
        }
    }
}

impl MotorModelConfig {
    /// Validate the section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if any value is non-finite or
    /// `time_constant <= 0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite("motor.gain", self.gain)?;
        ensure_finite("motor.time_constant", self.time_constant)?;
        ensure_finite("motor.initial_velocity", self.initial_velocity)?;
        if self.time_constant <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "motor.time_constant must be > 0, got {}",
                self.time_constant
            )));
        }
        Ok(())
    }
}

/// Complete configuration of the control unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VelocityUnitConfig {
    /// Service identity and log level (`[shared]`, required).
    pub shared: SharedConfig,
    /// Controller tuning and limits (`[controller]`).
    #[serde(default)]
    pub controller: VelocityControlParameters,
    /// Loop period and length (`[cycle]`).
    #[serde(default)]
    pub cycle: CycleConfig,
    /// Simulated motor the loop drives (`[motor]`).
    #[serde(default)]
    pub motor: MotorModelConfig,
}

impl VelocityUnitConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first section's `ConfigError::ValidationError`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.controller.validate()?;
        self.cycle.validate()?;
        self.motor.validate()
    }
}

/// Load and validate the control unit configuration.
pub fn load_config(path: &Path) -> Result<VelocityUnitConfig, ConfigError> {
    let config = VelocityUnitConfig::load(path)?;
    config.validate()?;
    Ok(config)
}
