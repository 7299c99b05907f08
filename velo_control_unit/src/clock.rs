//! Monotonic tick sources for the controller.
//!
//! The controller never reads time directly; it asks a [`Clock`] for the
//! current tick count. [`MonotonicClock`] backs production loops and
//! [`ManualClock`] gives tests and benches full control over elapsed time.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use velo_common::control::ClockResolution;

/// Monotonic, non-decreasing tick source.
pub trait Clock {
    /// Current reading in ticks.
    fn now(&self) -> u64;

    /// Number of ticks in one second.
    fn ticks_per_second(&self) -> u64;

    /// Ticks elapsed from `earlier` to `later`.
    ///
    /// Readings are 64-bit and do not wrap within any realistic uptime; a
    /// `later` reading that precedes `earlier` yields zero.
    #[inline]
    fn elapsed(&self, earlier: u64, later: u64) -> u64 {
        later.saturating_sub(earlier)
    }
}

/// `Instant`-backed clock counting ticks since its creation.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
    resolution: ClockResolution,
}

impl MonotonicClock {
    /// Create a clock with the given tick resolution, starting at tick 0.
    pub fn new(resolution: ClockResolution) -> Self {
        Self {
            origin: Instant::now(),
            resolution,
        }
    }

    /// Millisecond ticks.
    pub fn millis() -> Self {
        Self::new(ClockResolution::Millis)
    }

    /// Microsecond ticks.
    pub fn micros() -> Self {
        Self::new(ClockResolution::Micros)
    }

    /// Tick resolution of this clock.
    pub fn resolution(&self) -> ClockResolution {
        self.resolution
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::millis()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> u64 {
        let elapsed = self.origin.elapsed();
        match self.resolution {
            ClockResolution::Millis => elapsed.as_millis() as u64,
            ClockResolution::Micros => elapsed.as_micros() as u64,
        }
    }

    #[inline]
    fn ticks_per_second(&self) -> u64 {
        self.resolution.ticks_per_second()
    }
}

/// Externally driven clock.
///
/// Clones share the same tick counter, so a test can hand one clone to the
/// controller and advance time through another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
    ticks_per_second: u64,
}

impl ManualClock {
    /// Create a clock at tick 0 with the given resolution.
    pub fn new(resolution: ClockResolution) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(0)),
            ticks_per_second: resolution.ticks_per_second(),
        }
    }

    /// Millisecond ticks.
    pub fn millis() -> Self {
        Self::new(ClockResolution::Millis)
    }

    /// Advance the shared counter by `ticks`.
    #[inline]
    pub fn advance(&self, ticks: u64) {
        self.ticks.fetch_add(ticks, Ordering::Relaxed);
    }

    /// Set the shared counter to an absolute reading.
    pub fn set(&self, ticks: u64) {
        self.ticks.store(ticks, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    #[inline]
    fn ticks_per_second(&self) -> u64 {
        self.ticks_per_second
    }
}
