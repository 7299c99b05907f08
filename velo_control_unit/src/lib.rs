//! # Velo Control Unit Library
//!
//! Single-axis PI velocity control for motor speed regulation. Each cycle
//! takes a measured velocity, measures elapsed time from an injected
//! monotonic clock, and returns an effort clamped to configured limits with
//! clamp-and-back-off anti-windup.
//!
//! ## Modules
//!
//! - [`control::velocity`]: the controller
//! - [`clock`]: `Clock` trait, `MonotonicClock`, `ManualClock`
//! - [`cycle`]: fixed-period loop driving a controller against a [`sim::Plant`]
//! - [`config`]: TOML configuration of the binary
//!
//! ## Zero-Allocation Hot Path
//!
//! `VelocityController::run` performs no allocation, locking or blocking;
//! its only external call is the clock read.

#![deny(clippy::disallowed_types)]

pub mod clock;
pub mod config;
pub mod control;
pub mod cycle;
pub mod error;
pub mod sim;
