//! # Vein Search
//!
//! Breadth-first flood fill over the 26-connected neighbourhood of the
//! origin, bounded by a [`SearchBudget`].
//!
//! ## Ordering
//!
//! Neighbours are enumerated in the fixed order of [`NEIGHBOR_OFFSETS`]
//! (x-major, then y, then z). Results come back in discovery order, layer
//! by layer, which is also the order a cascade breaks them in.
//!
//! ## Cost
//!
//! Positions outside the range budget are marked visited without a world
//! query. Each in-range position is queried at most once.

use std::collections::{HashSet, VecDeque};

use lode_shared::{BlockId, BlockPos};

use crate::config::SearchBudget;
use crate::hooks::BlockAccess;

/// The 26 neighbour offsets in enumeration order.
pub const NEIGHBOR_OFFSETS: [[i32; 3]; 26] = build_offsets();

const fn build_offsets() -> [[i32; 3]; 26] {
    let mut offsets = [[0; 3]; 26];
    let mut index = 0;
    let mut dx = -1;
    while dx <= 1 {
        let mut dy = -1;
        while dy <= 1 {
            let mut dz = -1;
            while dz <= 1 {
                if dx != 0 || dy != 0 || dz != 0 {
                    offsets[index] = [dx, dy, dz];
                    index += 1;
                }
                dz += 1;
            }
            dy += 1;
        }
        dx += 1;
    }
    offsets
}

/// Bounded vein flood fill.
#[derive(Clone, Copy, Debug)]
pub struct VeinSearch {
    budget: SearchBudget,
}

impl VeinSearch {
    /// Creates a search with fixed limits.
    #[must_use]
    pub const fn new(budget: SearchBudget) -> Self {
        Self { budget }
    }

    /// The limits this search runs under.
    #[must_use]
    pub const fn budget(&self) -> SearchBudget {
        self.budget
    }

    /// Finds connected positions whose block satisfies `matches`.
    ///
    /// The origin itself is never part of the result and its block is not
    /// read. At most `max_blocks - 1` positions are returned.
    pub fn search(
        &self,
        origin: BlockPos,
        world: &dyn BlockAccess,
        matches: impl Fn(BlockId) -> bool,
    ) -> Vec<BlockPos> {
        let cap = self.budget.max_results();
        let mut found = Vec::new();
        if cap == 0 {
            return found;
        }

        let mut queue = VecDeque::with_capacity(64);
        let mut visited = HashSet::with_capacity(256);
        queue.push_back(origin);
        visited.insert(origin);

        while let Some(current) = queue.pop_front() {
            for [dx, dy, dz] in NEIGHBOR_OFFSETS {
                let neighbor = current.offset(dx, dy, dz);
                if !visited.insert(neighbor) {
                    continue;
                }
                if neighbor.chebyshev_distance(origin) > self.budget.max_range {
                    continue;
                }
                if !matches(world.block_at(neighbor)) {
                    continue;
                }

                found.push(neighbor);
                if found.len() >= cap {
                    tracing::debug!(
                        "Vein search at {} hit the {} block cap",
                        origin,
                        self.budget.max_blocks
                    );
                    return found;
                }
                queue.push_back(neighbor);
            }
        }

        found
    }
}
