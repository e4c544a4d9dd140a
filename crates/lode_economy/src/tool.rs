//! # Tools
//!
//! Held tools with enchantments and durability. Drop rolls read the
//! enchantments; vein mining wears the durability down.

use crate::inventory::ItemId;

/// Unique identifier of a tool instance.
pub type ToolId = u64;

/// Enchantments that affect block drops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Enchantments {
    /// Fortune level (0 = none). Adds bonus rolls to fortune-affected drops.
    pub fortune: u8,
    /// Silk touch: blocks drop themselves instead of their loot.
    pub silk_touch: bool,
}

/// State of a tool after taking wear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolCondition {
    /// Still usable.
    Intact {
        /// Durability left.
        remaining: u32,
    },
    /// Durability reached zero; the tool is gone.
    Broken,
    /// The tool is no longer in the entity's hand. No wear was applied.
    Missing,
}

impl ToolCondition {
    /// Returns true if the tool broke.
    #[inline]
    #[must_use]
    pub const fn is_broken(self) -> bool {
        matches!(self, Self::Broken)
    }
}

/// A tool instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tool {
    /// Instance id.
    pub id: ToolId,
    /// Item type of the tool, 0 for bare hand.
    pub item_id: ItemId,
    /// Enchantments.
    pub enchantments: Enchantments,
    /// Durability left.
    pub durability: u32,
    /// Durability when new.
    pub max_durability: u32,
}

impl Tool {
    /// Creates an unenchanted tool at full durability.
    #[must_use]
    pub const fn new(id: ToolId, item_id: ItemId, max_durability: u32) -> Self {
        Self {
            id,
            item_id,
            enchantments: Enchantments {
                fortune: 0,
                silk_touch: false,
            },
            durability: max_durability,
            max_durability,
        }
    }

    /// The empty hand. Never wears out.
    #[must_use]
    pub const fn bare_hand() -> Self {
        Self::new(0, 0, 0)
    }

    /// Returns the tool with the given enchantments, builder style.
    #[must_use]
    pub const fn with_enchantments(mut self, enchantments: Enchantments) -> Self {
        self.enchantments = enchantments;
        self
    }

    /// Returns true for the empty hand.
    #[inline]
    #[must_use]
    pub const fn is_bare_hand(&self) -> bool {
        self.item_id == 0
    }

    /// Applies `amount` points of wear.
    pub fn apply_wear(&mut self, amount: u32) -> ToolCondition {
        if self.is_bare_hand() {
            return ToolCondition::Intact { remaining: 0 };
        }
        self.durability = self.durability.saturating_sub(amount);
        if self.durability == 0 {
            ToolCondition::Broken
        } else {
            ToolCondition::Intact {
                remaining: self.durability,
            }
        }
    }
}
