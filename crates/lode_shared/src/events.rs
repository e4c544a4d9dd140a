//! Audiovisual effect events.
//!
//! Gameplay systems emit these fire-and-forget. The server forwards them to
//! clients; nothing waits on them.

use crate::math::Vec3;
use serde::{Deserialize, Serialize};

/// Particle effect kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Trail from the origin block to a block being vein-mined.
    Trail,
    /// Debris burst where a block was removed.
    BlockCrack,
    /// Break-progress overlay on a block. Stage 0-9, 9 is fully cracked.
    BreakProgress {
        /// Crack stage
        stage: u8,
    },
}

/// Sound effect kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundKind {
    /// A block broke.
    BlockBreak,
    /// A vein finished and its loot was spawned.
    VeinComplete,
}

/// A single effect emission.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EffectEvent {
    /// Particles at a point.
    Particles {
        /// Particle kind
        kind: ParticleKind,
        /// World position
        at: Vec3,
        /// Particle count
        count: u32,
    },
    /// A sound at a point.
    Sound {
        /// Sound kind
        kind: SoundKind,
        /// World position
        at: Vec3,
    },
}

impl EffectEvent {
    /// Returns the position of the effect.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        match self {
            Self::Particles { at, .. } | Self::Sound { at, .. } => *at,
        }
    }
}
