//! Fixed-period control cycle: read feedback → run controller → apply effort.
//!
//! Without the `rt` feature the loop paces itself with `std::thread::sleep`
//! and only counts overruns. With `rt` it sleeps on `CLOCK_MONOTONIC` with
//! `clock_nanosleep(TIMER_ABSTIME)` for drift-free pacing and aborts on the
//! first overrun.
//!
//! The controller is reset on entry so the first cycle measures `dt` from the
//! loop start rather than from construction.

use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::{CycleConfig, VelocityUnitConfig};
use crate::control::velocity::VelocityController;
use crate::error::CycleError;
use crate::sim::{MotorModel, Plant};

/// Progress is logged every this many cycles.
const PROGRESS_INTERVAL: u64 = 100;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-cycle timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Number of overruns detected.
    pub overruns: u64,
    /// Maximum wake-up latency [ns].
    pub max_latency_ns: i64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a cycle duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += duration_ns;
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average cycle time [ns] (0 if no cycles).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Owns a controller and the plant it drives.
pub struct CycleRunner<P: Plant, C: Clock> {
    controller: VelocityController<C>,
    plant: P,
    stats: CycleStats,
    cycle_time_ns: i64,
    /// Nominal period handed to the plant [s].
    cycle_dt: f64,
    max_cycles: u64,
}

impl<P: Plant, C: Clock> CycleRunner<P, C> {
    pub fn new(controller: VelocityController<C>, plant: P, cycle: &CycleConfig) -> Self {
        Self {
            controller,
            plant,
            stats: CycleStats::new(),
            cycle_time_ns: cycle.cycle_time_ns(),
            cycle_dt: cycle.cycle_time_s(),
            max_cycles: cycle.max_cycles,
        }
    }

    pub fn controller(&self) -> &VelocityController<C> {
        &self.controller
    }

    /// Mutable access for retuning between runs.
    pub fn controller_mut(&mut self) -> &mut VelocityController<C> {
        &mut self.controller
    }

    pub fn plant(&self) -> &P {
        &self.plant
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// One read → control → write pass. Returns the applied effort.
    #[inline]
    pub fn cycle_body(&mut self) -> f64 {
        let feedback = self.plant.feedback();
        let effort = self.controller.run(feedback);
        self.plant.apply(effort, self.cycle_dt);
        effort
    }

    /// Execute `max_cycles` paced cycles.
    ///
    /// # Errors
    /// With the `rt` feature: `CycleError::RtSetup` if the monotonic clock
    /// cannot be read, `CycleError::CycleOverrun` on the first late cycle.
    pub fn run(&mut self) -> Result<&CycleStats, CycleError> {
        self.controller.reset();
        info!(
            cycles = self.max_cycles,
            cycle_time_ns = self.cycle_time_ns,
            setpoint = self.controller.setpoint(),
            "entering control loop"
        );

        #[cfg(feature = "rt")]
        self.run_rt_loop()?;

        #[cfg(not(feature = "rt"))]
        self.run_sim_loop();

        info!(
            cycles = self.stats.cycle_count,
            overruns = self.stats.overruns,
            avg_cycle_ns = self.stats.avg_cycle_ns(),
            "control loop finished"
        );
        Ok(&self.stats)
    }

    #[cfg(not(feature = "rt"))]
    fn run_sim_loop(&mut self) {
        use std::time::{Duration, Instant};

        let cycle_duration = Duration::from_nanos(self.cycle_time_ns as u64);

        for _ in 0..self.max_cycles {
            let cycle_start = Instant::now();

            let effort = self.cycle_body();

            let elapsed = cycle_start.elapsed();
            let duration_ns = elapsed.as_nanos() as i64;
            self.stats.record(duration_ns, 0);
            if duration_ns > self.cycle_time_ns {
                self.stats.overruns += 1;
            }
            self.log_progress(effort);

            if let Some(remaining) = cycle_duration.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
    }

    #[cfg(feature = "rt")]
    fn run_rt_loop(&mut self) -> Result<(), CycleError> {
        use nix::time::{ClockId, ClockNanosleepFlags, clock_gettime, clock_nanosleep};

        let clock = ClockId::CLOCK_MONOTONIC;
        let mut next_wake = clock_gettime(clock)
            .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;

        for _ in 0..self.max_cycles {
            next_wake = timespec_add_ns(next_wake, self.cycle_time_ns);

            let cycle_start = clock_gettime(clock)
                .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;

            let effort = self.cycle_body();

            let cycle_end = clock_gettime(clock)
                .map_err(|e| CycleError::RtSetup(format!("clock_gettime: {e}")))?;
            let duration_ns = timespec_diff_ns(&cycle_end, &cycle_start);
            self.stats.record(duration_ns, 0);

            if duration_ns > self.cycle_time_ns {
                self.stats.overruns += 1;
                return Err(CycleError::CycleOverrun {
                    actual_ns: duration_ns,
                    budget_ns: self.cycle_time_ns,
                });
            }
            self.log_progress(effort);

            let _ = clock_nanosleep(clock, ClockNanosleepFlags::TIMER_ABSTIME, &next_wake);
            if let Ok(woke) = clock_gettime(clock) {
                let latency_ns = timespec_diff_ns(&woke, &next_wake).abs();
                self.stats.max_latency_ns = self.stats.max_latency_ns.max(latency_ns);
            }
        }
        Ok(())
    }

    fn log_progress(&self, effort: f64) {
        if self.stats.cycle_count % PROGRESS_INTERVAL == 0 {
            debug!(
                cycle = self.stats.cycle_count,
                feedback = self.plant.feedback(),
                effort,
                integrator = self.controller.integrator(),
                "cycle progress"
            );
        }
    }
}

impl<C: Clock> CycleRunner<MotorModel, C> {
    /// Build a controller and motor model from a full configuration.
    ///
    /// # Errors
    /// - `CycleError::Config` if any section fails validation.
    /// - `CycleError::Control` if the controller rejects its parameters.
    pub fn from_config(config: &VelocityUnitConfig, clock: C) -> Result<Self, CycleError> {
        config.validate()?;
        let controller = VelocityController::from_params(&config.controller, clock)?;
        let motor = MotorModel::from_config(&config.motor);
        Ok(Self::new(controller, motor, &config.cycle))
    }
}

/// Add nanoseconds to a `TimeSpec`, normalizing the result.
#[cfg(feature = "rt")]
fn timespec_add_ns(ts: nix::sys::time::TimeSpec, ns: i64) -> nix::sys::time::TimeSpec {
    use nix::sys::time::TimeSpec;
    let mut secs = ts.tv_sec();
    let mut nanos = ts.tv_nsec() + ns;
    while nanos >= 1_000_000_000 {
        secs += 1;
        nanos -= 1_000_000_000;
    }
    TimeSpec::new(secs, nanos)
}

/// Difference (a - b) in nanoseconds.
#[cfg(feature = "rt")]
fn timespec_diff_ns(a: &nix::sys::time::TimeSpec, b: &nix::sys::time::TimeSpec) -> i64 {
    (a.tv_sec() - b.tv_sec()) * 1_000_000_000 + (a.tv_nsec() - b.tv_nsec())
}

// ─── Tests ──────────────────────────────────────────────────────────
