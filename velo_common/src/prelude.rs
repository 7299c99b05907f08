//! Prelude module for common re-exports.
//!
//! ```rust
//! use velo_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── Control ────────────────────────────────────────────────────────
pub use crate::consts::{DEFAULT_CYCLE_TIME_US, DEFAULT_EFFORT_MAX, DEFAULT_EFFORT_MIN};
pub use crate::control::{ClockResolution, VelocityControlParameters, VelocitySnapshot};

/// Default control cycle time as Duration.
pub const DEFAULT_CYCLE_TIME: Duration = Duration::from_micros(DEFAULT_CYCLE_TIME_US as u64);
