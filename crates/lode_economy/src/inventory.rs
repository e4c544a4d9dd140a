//! # Inventory System
//!
//! Pre-allocated inventory slots for items, plus carry-weight accounting.
//! A heavy pack makes vein mining cost more stamina.

use std::collections::HashMap;

use crate::error::{EconomyError, EconomyResult};
use crate::fixed_point::FixedPoint;

/// Unique identifier for an item type.
pub type ItemId = u32;

/// A stack of items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ItemStack {
    /// The item type ID, or 0 for empty slot.
    pub item_id: ItemId,
    /// Number of items in this stack.
    pub count: u32,
}

impl ItemStack {
    /// Creates an empty item stack.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            item_id: 0,
            count: 0,
        }
    }

    /// Creates a new item stack.
    #[inline]
    #[must_use]
    pub const fn new(item_id: ItemId, count: u32) -> Self {
        Self { item_id, count }
    }

    /// Returns true if this slot is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0 || self.item_id == 0
    }

}

/// Maximum inventory slots.
pub const MAX_INVENTORY_SLOTS: usize = 36;

/// Default maximum stack size.
pub const DEFAULT_MAX_STACK: u32 = 64;

/// A pre-allocated inventory.
///
/// All slots are allocated at creation time.
/// No allocations occur during add/remove operations.
#[derive(Clone, Debug)]
pub struct Inventory {
    /// Pre-allocated slots.
    slots: [ItemStack; MAX_INVENTORY_SLOTS],
    /// Number of slots currently in use.
    used_slots: u32,
}

impl Inventory {
    /// Creates a new empty inventory with pre-allocated slots.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [ItemStack::empty(); MAX_INVENTORY_SLOTS],
            used_slots: 0,
        }
    }

    /// Returns the number of used slots.
    #[inline]
    #[must_use]
    pub const fn used_slots(&self) -> u32 {
        self.used_slots
    }

    /// Checks if the inventory is full.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.used_slots as usize >= MAX_INVENTORY_SLOTS
    }

    /// Iterates over the non-empty slots.
    pub fn stacks(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().filter(|s| !s.is_empty())
    }

    /// Counts the total number of a specific item across all slots.
    #[must_use]
    pub fn count_item(&self, item_id: ItemId) -> u32 {
        self.slots
            .iter()
            .filter(|s| s.item_id == item_id)
            .map(|s| s.count)
            .sum()
    }

    /// Finds the first empty slot.
    #[must_use]
    pub fn find_empty_slot(&self) -> Option<usize> {
        self.slots.iter().position(ItemStack::is_empty)
    }

    /// Adds items to the inventory.
    ///
    /// First tries to stack with existing items, then uses empty slots.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InventoryFull` if there's no space. Items that
    /// did fit stay in the inventory.
    pub fn add(&mut self, item_id: ItemId, count: u32, max_stack: u32) -> EconomyResult<()> {
        let mut remaining = count;

        // First, try to add to existing stacks
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }

            if slot.item_id == item_id && slot.count < max_stack {
                let can_add = (max_stack - slot.count).min(remaining);
                slot.count += can_add;
                remaining -= can_add;
            }
        }

        // Then, use empty slots
        while remaining > 0 {
            let Some(slot_idx) = self.find_empty_slot() else {
                return Err(EconomyError::InventoryFull {
                    capacity: MAX_INVENTORY_SLOTS as u32,
                    amount: remaining,
                });
            };
            let add_count = remaining.min(max_stack);
            self.slots[slot_idx] = ItemStack::new(item_id, add_count);
            self.used_slots += 1;
            remaining -= add_count;
        }

        Ok(())
    }

    /// Total carried weight according to `weights`.
    ///
    /// Saturates instead of overflowing.
    #[must_use]
    pub fn carried_weight(&self, weights: &ItemWeights) -> FixedPoint {
        self.stacks().fold(FixedPoint::ZERO, |total, stack| {
            let stack_weight = weights
                .weight_of(stack.item_id)
                .checked_mul_int(u64::from(stack.count))
                .unwrap_or(FixedPoint::MAX);
            total.saturating_add(stack_weight)
        })
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-item weights used for carry-weight penalties.
#[derive(Clone, Debug, Default)]
pub struct ItemWeights {
    /// Weight of items with no explicit entry.
    pub default_weight: FixedPoint,
    /// Explicit weights by item id.
    pub items: HashMap<ItemId, FixedPoint>,
}

impl ItemWeights {
    /// Creates a weight table where every item weighs `default_weight`.
    #[must_use]
    pub fn uniform(default_weight: FixedPoint) -> Self {
        Self {
            default_weight,
            items: HashMap::new(),
        }
    }

    /// Sets the weight of one item, builder style.
    #[must_use]
    pub fn with(mut self, item_id: ItemId, weight: FixedPoint) -> Self {
        self.items.insert(item_id, weight);
        self
    }

    /// Weight of a single item.
    #[must_use]
    pub fn weight_of(&self, item_id: ItemId) -> FixedPoint {
        self.items
            .get(&item_id)
            .copied()
            .unwrap_or(self.default_weight)
    }
}
