//! # Server Constants
//!
//! Values baked into every build. Tunable gameplay numbers live in the TOML
//! configuration instead.

/// Server tick rate (updates per second).
pub const TICK_RATE: u32 = 20;

/// Duration of one tick in microseconds.
pub const TICK_DURATION_MICROS: u64 = 1_000_000 / TICK_RATE as u64;

/// Name of the empty block. Always registered as [`crate::BlockId::AIR`].
pub const AIR_NAME: &str = "air";
