//! Workspace-wide constants.
//!
//! Single source of truth for default limits and timing.

/// Default lower effort bound [% drive].
pub const DEFAULT_EFFORT_MIN: f64 = -100.0;

/// Default upper effort bound [% drive].
pub const DEFAULT_EFFORT_MAX: f64 = 100.0;

/// Default control cycle time in microseconds (100 Hz).
pub const DEFAULT_CYCLE_TIME_US: u32 = 10_000;

/// Default number of cycles executed by the control unit binary.
pub const DEFAULT_MAX_CYCLES: u64 = 500;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/velocity.toml";

/// Ticks per second of a millisecond-resolution clock.
pub const MILLIS_PER_SECOND: u64 = 1_000;

/// Ticks per second of a microsecond-resolution clock.
pub const MICROS_PER_SECOND: u64 = 1_000_000;
