//! # Stamina
//!
//! A per-entity stamina pool. Regeneration is driven from outside; this type
//! only knows how to spend.

use crate::fixed_point::FixedPoint;

/// Stamina of one entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaminaPool {
    current: FixedPoint,
    max: FixedPoint,
}

impl StaminaPool {
    /// Creates a full pool.
    #[must_use]
    pub const fn full(max: FixedPoint) -> Self {
        Self { current: max, max }
    }

    /// Creates a pool with an explicit current value, clamped to `max`.
    #[must_use]
    pub fn with_current(current: FixedPoint, max: FixedPoint) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    /// Current stamina.
    #[inline]
    #[must_use]
    pub const fn current(&self) -> FixedPoint {
        self.current
    }

    /// Maximum stamina.
    #[inline]
    #[must_use]
    pub const fn max(&self) -> FixedPoint {
        self.max
    }

    /// Spends `amount` if the pool holds at least that much.
    ///
    /// Returns false and leaves the pool untouched otherwise.
    #[must_use]
    pub fn try_spend(&mut self, amount: FixedPoint) -> bool {
        match self.current.checked_sub(amount) {
            Some(rest) => {
                self.current = rest;
                true
            }
            None => false,
        }
    }
}
