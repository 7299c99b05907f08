//! PI velocity controller with forward Euler integration and
//! clamp-and-back-off anti-windup.
//!
//! `dt` is measured from the injected [`Clock`] on every call, floored at one
//! tick so back-to-back calls inside the same tick never integrate over zero
//! time. The floor biases integration slightly high on loops faster than the
//! clock resolution.
//!
//! The returned effort is always finite and within the limits. A sample that
//! would push the integrator out of the finite range or make the effort NaN
//! (non-finite feedback, or a `setpoint - feedback` overflow) is dropped:
//! `run` returns the previous output and leaves all state untouched.
//!
//! Not reentrant and not internally synchronized. Callers sharing a
//! controller between threads must serialize all access.

use tracing::warn;
use velo_common::consts::{DEFAULT_EFFORT_MAX, DEFAULT_EFFORT_MIN};
use velo_common::control::{VelocityControlParameters, VelocitySnapshot};

use crate::clock::Clock;
use crate::error::{ControlError, finite};

/// Single-axis PI velocity controller.
#[derive(Debug, Clone)]
pub struct VelocityController<C: Clock> {
    /// Proportional gain.
    kp: f64,
    /// Integral gain.
    ki: f64,
    /// Target velocity [rad/s].
    setpoint: f64,
    effort_min: f64,
    effort_max: f64,
    /// Accumulated error·time [rad].
    integrator: f64,
    /// Clock reading of the previous run (or construction / reset).
    last_time: u64,
    /// Last returned effort.
    output: f64,
    clock: C,
}

impl<C: Clock> VelocityController<C> {
    /// Create a controller with zeroed integrator and output.
    ///
    /// # Errors
    /// - `ControlError::NonFinite` if a gain or the setpoint is NaN/Inf.
    /// - `ControlError::InvalidLimits` if a limit is non-finite or
    ///   `effort_min > effort_max`.
    pub fn new(
        kp: f64,
        ki: f64,
        setpoint: f64,
        effort_min: f64,
        effort_max: f64,
        clock: C,
    ) -> Result<Self, ControlError> {
        let kp = finite("kp", kp)?;
        let ki = finite("ki", ki)?;
        let setpoint = finite("setpoint", setpoint)?;
        check_limits(effort_min, effort_max)?;
        let last_time = clock.now();

        Ok(Self {
            kp,
            ki,
            setpoint,
            effort_min,
            effort_max,
            integrator: 0.0,
            last_time,
            output: 0.0,
            clock,
        })
    }

    /// Zero gains and setpoint, effort limits `[-100, 100]`.
    pub fn with_defaults(clock: C) -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            setpoint: 0.0,
            effort_min: DEFAULT_EFFORT_MIN,
            effort_max: DEFAULT_EFFORT_MAX,
            integrator: 0.0,
            last_time: clock.now(),
            output: 0.0,
            clock,
        }
    }

    /// Build a controller from the `[controller]` config section.
    ///
    /// The clock's resolution is taken from `clock`; `params.clock_resolution`
    /// is only consulted by callers constructing the clock.
    pub fn from_params(params: &VelocityControlParameters, clock: C) -> Result<Self, ControlError> {
        Self::new(
            params.kp,
            params.ki,
            params.setpoint,
            params.effort_min,
            params.effort_max,
            clock,
        )
    }

    /// Clear integrator and output and restart elapsed-time measurement now.
    ///
    /// Call when resuming after a pause so the next run neither integrates
    /// over the idle period nor carries stale error.
    pub fn reset(&mut self) {
        self.integrator = 0.0;
        self.output = 0.0;
        self.last_time = self.clock.now();
    }

    /// Replace both gains. Takes effect on the next [`run`](Self::run).
    ///
    /// On error neither gain is changed.
    pub fn set_gains(&mut self, kp: f64, ki: f64) -> Result<(), ControlError> {
        let kp = finite("kp", kp)?;
        let ki = finite("ki", ki)?;
        self.kp = kp;
        self.ki = ki;
        Ok(())
    }

    /// Replace the target velocity [rad/s].
    pub fn set_setpoint(&mut self, setpoint: f64) -> Result<(), ControlError> {
        self.setpoint = finite("setpoint", setpoint)?;
        Ok(())
    }

    /// Replace the effort bounds. The cached output is not re-clamped.
    pub fn set_limits(&mut self, effort_min: f64, effort_max: f64) -> Result<(), ControlError> {
        check_limits(effort_min, effort_max)?;
        self.effort_min = effort_min;
        self.effort_max = effort_max;
        Ok(())
    }

    /// Execute one control cycle and return the clamped effort.
    ///
    /// Non-finite `feedback` is rejected: the previous output is returned and
    /// no state changes, so the next accepted sample integrates over the
    /// whole gap. The same applies to finite feedback whose error overflows,
    /// i.e. when the integrator would leave the finite range or the
    /// unclamped effort is NaN.
    #[inline]
    pub fn run(&mut self, feedback: f64) -> f64 {
        if !feedback.is_finite() {
            warn!(feedback, output = self.output, "rejecting non-finite velocity feedback");
            return self.output;
        }

        // ── Elapsed time (floored at one tick) ──────────────────
        let now = self.clock.now();
        let ticks = self.clock.elapsed(self.last_time, now).max(1);
        let dt = ticks as f64 / self.clock.ticks_per_second() as f64;

        // ── PI ──────────────────────────────────────────────────
        let error = self.setpoint - feedback;
        let increment = error * dt;
        let mut integrator = self.integrator + increment;
        let mut u = self.kp * error + self.ki * integrator;

        // A finite integrator implies a finite error and increment.
        if !integrator.is_finite() || u.is_nan() {
            warn!(
                feedback,
                setpoint = self.setpoint,
                output = self.output,
                "rejecting velocity feedback: control law overflowed"
            );
            return self.output;
        }

        // ── Clamp and back off ──────────────────────────────────
        // The increment is withdrawn only when it pushes further into the
        // active limit, whichever term caused the saturation.
        if u > self.effort_max {
            u = self.effort_max;
            if error > 0.0 {
                integrator -= increment;
            }
        } else if u < self.effort_min {
            u = self.effort_min;
            if error < 0.0 {
                integrator -= increment;
            }
        }

        self.last_time = now;
        self.integrator = integrator;
        self.output = u;
        u
    }

    /// Proportional gain.
    #[inline]
    pub fn kp(&self) -> f64 {
        self.kp
    }

    /// Integral gain.
    #[inline]
    pub fn ki(&self) -> f64 {
        self.ki
    }

    /// Target velocity [rad/s].
    #[inline]
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// `(effort_min, effort_max)`.
    #[inline]
    pub fn effort_limits(&self) -> (f64, f64) {
        (self.effort_min, self.effort_max)
    }

    /// Accumulated error·time.
    #[inline]
    pub fn integrator(&self) -> f64 {
        self.integrator
    }

    /// Last value returned by [`run`](Self::run), 0 after construction or reset.
    #[inline]
    pub fn output(&self) -> f64 {
        self.output
    }

    /// Clock reading taken by the last run, reset or construction.
    #[inline]
    pub fn last_time(&self) -> u64 {
        self.last_time
    }

    /// The clock driving this controller.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Copy of gains, setpoint and dynamic state.
    pub fn snapshot(&self) -> VelocitySnapshot {
        VelocitySnapshot {
            kp: self.kp,
            ki: self.ki,
            setpoint: self.setpoint,
            integrator: self.integrator,
            output: self.output,
        }
    }
}

fn check_limits(effort_min: f64, effort_max: f64) -> Result<(), ControlError> {
    if effort_min.is_finite() && effort_max.is_finite() && effort_min <= effort_max {
        Ok(())
    } else {
        Err(ControlError::InvalidLimits {
            min: effort_min,
            max: effort_max,
        })
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
