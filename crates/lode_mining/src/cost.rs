//! # Cost Gate
//!
//! Prices a vein and debits the actor's stamina in a single atomic step.
//!
//! ```text
//! total = count × per_block_cost × (1 + weight_penalty × weight_scaling)
//! ```
//!
//! All arithmetic is fixed-point. An overflowing price saturates to
//! [`FixedPoint::MAX`], which no ledger can afford.

use lode_economy::FixedPoint;

use crate::hooks::{ActorId, StaminaLedger, WeightProvider};

/// Result of a reservation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum Reservation {
    /// The cost was debited.
    Granted {
        /// Amount debited
        cost: FixedPoint,
    },
    /// The actor could not afford it. Nothing was debited.
    Declined {
        /// Amount that was asked for
        cost: FixedPoint,
    },
}

impl Reservation {
    /// Whether the cost was paid.
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// The computed cost either way.
    #[must_use]
    pub const fn cost(&self) -> FixedPoint {
        match self {
            Self::Granted { cost } | Self::Declined { cost } => *cost,
        }
    }
}

/// Stamina pricing for vein activations.
#[derive(Clone, Copy, Debug)]
pub struct CostGate {
    per_block_cost: FixedPoint,
    weight_scaling: FixedPoint,
}

impl CostGate {
    /// Creates a gate with fixed pricing.
    #[must_use]
    pub const fn new(per_block_cost: FixedPoint, weight_scaling: FixedPoint) -> Self {
        Self {
            per_block_cost,
            weight_scaling,
        }
    }

    /// Price of breaking `count` blocks with the given weight penalty.
    #[must_use]
    pub fn total_cost(&self, count: usize, weight_penalty: FixedPoint) -> FixedPoint {
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        weight_penalty
            .checked_mul(self.weight_scaling)
            .and_then(|scaled| FixedPoint::ONE.checked_add(scaled))
            .and_then(|multiplier| {
                self.per_block_cost
                    .checked_mul_int(count)
                    .and_then(|base| base.checked_mul(multiplier))
            })
            .unwrap_or(FixedPoint::MAX)
    }

    /// Prices `count` blocks for `actor` and tries to debit the price.
    ///
    /// A zero price is granted without touching the ledger.
    pub fn try_reserve(
        &self,
        count: usize,
        actor: ActorId,
        weight: &dyn WeightProvider,
        ledger: &dyn StaminaLedger,
    ) -> Reservation {
        let penalty = weight.weight_penalty(actor);
        let cost = self.total_cost(count, penalty);

        if cost.is_zero() {
            return Reservation::Granted { cost };
        }

        if ledger.try_debit(actor, cost) {
            tracing::debug!("Entity {} paid {} stamina for {} blocks", actor, cost, count);
            Reservation::Granted { cost }
        } else {
            tracing::debug!(
                "Entity {} cannot afford {} stamina for {} blocks",
                actor,
                cost,
                count
            );
            Reservation::Declined { cost }
        }
    }
}
