//! Simulated velocity plant.
//!
//! Stands in for the motor driver and encoder pipeline so the loop can run
//! closed without hardware.

use crate::config::MotorModelConfig;

/// Anything that consumes effort and reports a velocity.
pub trait Plant {
    /// Measured velocity [rad/s].
    fn feedback(&self) -> f64;

    /// Apply `effort` for `dt` seconds.
    fn apply(&mut self, effort: f64, dt: f64);
}

/// First-order motor: `tau · dv/dt = K · u − v`, forward Euler.
#[derive(Debug, Clone, Copy)]
pub struct MotorModel {
    velocity: f64,
    gain: f64,
    time_constant: f64,
}

impl MotorModel {
    pub fn new(gain: f64, time_constant: f64) -> Self {
        Self {
            velocity: 0.0,
            gain,
            time_constant,
        }
    }

    pub fn from_config(config: &MotorModelConfig) -> Self {
        Self {
            velocity: config.initial_velocity,
            gain: config.gain,
            time_constant: config.time_constant,
        }
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}

impl Plant for MotorModel {
    #[inline]
    fn feedback(&self) -> f64 {
        self.velocity
    }

    #[inline]
    fn apply(&mut self, effort: f64, dt: f64) {
        let accel = (self.gain * effort - self.velocity) / self.time_constant;
        self.velocity += accel * dt;
    }
}
