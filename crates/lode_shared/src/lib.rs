//! # LODE Shared
//!
//! Common value types used by every LODE crate.
//!
//! ## CRITICAL RULE
//!
//! This crate holds data, not behavior:
//! - positions and vectors
//! - block identities and the block registry
//! - effect kinds emitted by gameplay systems
//!
//! If you need world access, put it behind a trait in the crate that uses it.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod block;
pub mod constants;
pub mod events;
pub mod math;

pub use block::{BlockDef, BlockId, BlockRegistry};
pub use constants::{TICK_RATE, TICK_DURATION_MICROS};
pub use events::{EffectEvent, ParticleKind, SoundKind};
pub use math::{BlockPos, Vec3};
