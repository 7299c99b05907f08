//! Control engine root.
//!
//! PI velocity control with clamp-and-back-off anti-windup.

pub mod velocity;
