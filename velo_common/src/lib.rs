//! Velo Common Library
//!
//! Shared constants, configuration loading and controller parameter types
//! for the velocity control workspace.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Default limits and timing constants
//! - [`control`] - PI velocity controller parameters and snapshots
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use velo_common::config::{ConfigLoader, SharedConfig};
//! use velo_common::control::VelocityControlParameters;
//! ```

pub mod config;
pub mod consts;
pub mod control;
pub mod prelude;
