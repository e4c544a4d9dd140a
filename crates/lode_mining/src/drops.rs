//! # Drop Consolidation
//!
//! Holds every stack a session's breaks produced, then spawns them all at
//! the origin block in one go. A consolidator drains exactly once.

use lode_economy::ItemStack;
use lode_shared::BlockPos;

use crate::hooks::ItemSpawner;

/// What a drain put into the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Item entities spawned
    pub stacks: u32,
    /// Items across those entities
    pub items: u64,
    /// Stacks the spawner refused
    pub lost: u32,
}

/// Append-only drop accumulator for one session.
#[derive(Debug, Default)]
pub struct DropConsolidator {
    pending: Vec<ItemStack>,
    drained: bool,
}

impl DropConsolidator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `stacks` in. Empty stacks are ignored.
    pub fn accumulate(&mut self, stacks: &[ItemStack]) {
        if self.drained {
            tracing::warn!("Dropped {} stacks accumulated after drain", stacks.len());
            return;
        }
        self.pending
            .extend(stacks.iter().filter(|stack| !stack.is_empty()).copied());
    }

    /// Stacks waiting to be spawned.
    #[must_use]
    pub fn pending(&self) -> &[ItemStack] {
        &self.pending
    }

    /// Whether the drain already happened.
    #[must_use]
    pub const fn is_drained(&self) -> bool {
        self.drained
    }

    /// Spawns every pending stack at `origin`.
    ///
    /// Only stacks the spawner accepted are counted as spawned. Returns
    /// `None` without spawning anything if already drained.
    pub fn drain_and_spawn(
        &mut self,
        origin: BlockPos,
        spawner: &mut dyn ItemSpawner,
    ) -> Option<DrainSummary> {
        if self.drained {
            tracing::warn!("Drop consolidator at {} drained twice", origin);
            return None;
        }
        self.drained = true;

        let mut summary = DrainSummary::default();
        for stack in self.pending.drain(..) {
            if spawner.spawn_item(origin, stack) {
                summary.stacks += 1;
                summary.items += u64::from(stack.count);
            } else {
                summary.lost += 1;
            }
        }
        if summary.lost > 0 {
            tracing::warn!(
                "{} of {} stacks at {} could not be spawned",
                summary.lost,
                summary.lost + summary.stacks,
                origin
            );
        }
        Some(summary)
    }
}
