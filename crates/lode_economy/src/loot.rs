//! # Loot Table System
//!
//! Enchantment-aware block drops.
//!
//! Each block type maps to a [`LootTable`]: a list of entries, each rolling
//! a quantity between its bounds. Fortune multiplies fortune-affected
//! entries; silk touch replaces the whole table with the block's own item.
//!
//! ## Determinism
//!
//! Rolls come from SipHash-2-4 keyed with a server secret and fed the block
//! position, block type, entry index and a monotonic action nonce. The same
//! secret and the same sequence of actions reproduce the same drops, which
//! keeps replays and tests exact while staying unpredictable to clients.

use std::collections::HashMap;
use std::hash::Hasher;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use lode_shared::{BlockId, BlockPos, BlockRegistry};
use serde::Deserialize;
use siphasher::sip128::{Hasher128, SipHasher24};

use crate::error::{EconomyError, EconomyResult};
use crate::inventory::{ItemId, ItemStack};
use crate::tool::Tool;

/// A single entry in a loot table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LootEntry {
    /// The item ID to drop.
    pub item_id: ItemId,
    /// Minimum quantity.
    pub min_quantity: u32,
    /// Maximum quantity.
    pub max_quantity: u32,
    /// Whether fortune multiplies this entry.
    #[serde(default)]
    pub fortune: bool,
}

/// A complete loot table for a block type.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LootTable {
    /// Block name this table is for.
    pub block: String,
    /// Item dropped instead of the entries when mined with silk touch.
    #[serde(default)]
    pub silk_touch_item: Option<ItemId>,
    /// All drops from this block.
    #[serde(default)]
    pub entries: Vec<LootEntry>,
}

/// On-disk layout of the loot file.
#[derive(Deserialize)]
struct LootFile {
    #[serde(default)]
    tables: Vec<LootTable>,
}

/// Server-side secret keying the drop hash.
#[derive(Clone)]
pub struct LootSeed {
    keys: [u64; 2],
}

impl LootSeed {
    /// Creates a seed from 16 secret bytes.
    #[must_use]
    pub fn new(secret: &[u8; 16]) -> Self {
        let mut low = [0u8; 8];
        let mut high = [0u8; 8];
        low.copy_from_slice(&secret[..8]);
        high.copy_from_slice(&secret[8..]);
        Self {
            keys: [u64::from_le_bytes(low), u64::from_le_bytes(high)],
        }
    }

    /// Creates a test seed (NOT FOR PRODUCTION).
    #[must_use]
    pub const fn test_seed() -> Self {
        Self {
            keys: [0x1234_5678_9ABC_DEF0, 0xFEDC_BA98_7654_3210],
        }
    }
}

impl Default for LootSeed {
    fn default() -> Self {
        Self::test_seed()
    }
}

impl std::fmt::Debug for LootSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // NEVER expose the secret in debug output
        f.debug_struct("LootSeed")
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

/// All loot tables, indexed by block id.
#[derive(Debug)]
pub struct LootTables {
    tables: HashMap<BlockId, LootTable>,
    seed: LootSeed,
    /// Action nonce counter (monotonic, per-server).
    action_nonce: AtomicU64,
}

impl LootTables {
    /// Creates an empty set of tables.
    #[must_use]
    pub fn new(seed: LootSeed) -> Self {
        Self {
            tables: HashMap::new(),
            seed,
            action_nonce: AtomicU64::new(0),
        }
    }

    /// Parses loot tables from TOML, resolving block names via `registry`.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` on malformed TOML, an unknown
    /// block name, or an entry whose minimum exceeds its maximum.
    pub fn from_toml_str(
        source: &str,
        registry: &BlockRegistry,
        seed: LootSeed,
    ) -> EconomyResult<Self> {
        let file: LootFile =
            toml::from_str(source).map_err(|e| EconomyError::InvalidConfig(e.to_string()))?;

        let mut tables = Self::new(seed);
        for table in file.tables {
            let block = registry.id(&table.block).ok_or_else(|| {
                EconomyError::InvalidConfig(format!(
                    "loot table for unknown block {:?}",
                    table.block
                ))
            })?;
            tables.register(block, table)?;
        }
        tracing::debug!("Loaded {} loot tables", tables.len());
        Ok(tables)
    }

    /// Loads loot tables from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` if the file cannot be read or parsed.
    pub fn load(
        path: impl AsRef<Path>,
        registry: &BlockRegistry,
        seed: LootSeed,
    ) -> EconomyResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| EconomyError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source, registry, seed)
    }

    /// Registers the loot table of a block type.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` if an entry's minimum exceeds its maximum.
    pub fn register(&mut self, block: BlockId, table: LootTable) -> EconomyResult<()> {
        if let Some(entry) = table.entries.iter().find(|e| e.min_quantity > e.max_quantity) {
            return Err(EconomyError::InvalidConfig(format!(
                "loot entry for item {} in {:?} has min {} > max {}",
                entry.item_id, table.block, entry.min_quantity, entry.max_quantity
            )));
        }
        self.tables.insert(block, table);
        Ok(())
    }

    /// Number of registered tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if no tables are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Rolls the drops for one broken block.
    ///
    /// Blocks without a table drop nothing. Every call consumes one action
    /// nonce, so mining the same position twice rolls independently.
    #[must_use]
    pub fn roll(&self, block: BlockId, position: BlockPos, tool: &Tool) -> Vec<ItemStack> {
        let Some(table) = self.tables.get(&block) else {
            return Vec::new();
        };

        if tool.enchantments.silk_touch {
            return table
                .silk_touch_item
                .map(|item_id| vec![ItemStack::new(item_id, 1)])
                .unwrap_or_default();
        }

        let nonce = self.action_nonce.fetch_add(1, Ordering::Relaxed);
        let fortune = u64::from(tool.enchantments.fortune);

        table
            .entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let hash = self.compute_hash(block, position, index as u32, nonce);

                let range = u64::from(entry.max_quantity - entry.min_quantity) + 1;
                let mut quantity = u64::from(entry.min_quantity) + (hash % range);

                if entry.fortune && fortune > 0 {
                    // Uniform bonus multiplier in 1..=fortune+1.
                    quantity *= 1 + ((hash >> 32) % (fortune + 1));
                }

                let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                (quantity > 0).then(|| ItemStack::new(entry.item_id, quantity))
            })
            .collect()
    }

    /// SipHash-2-4 over the roll inputs, folded to 64 bits.
    #[inline]
    fn compute_hash(&self, block: BlockId, position: BlockPos, entry: u32, nonce: u64) -> u64 {
        let mut hasher = SipHasher24::new_with_keys(self.seed.keys[0], self.seed.keys[1]);
        hasher.write_i32(position.x);
        hasher.write_i32(position.y);
        hasher.write_i32(position.z);
        hasher.write_u16(block.0);
        hasher.write_u32(entry);
        hasher.write_u64(nonce);
        let result = hasher.finish128();
        result.h1 ^ result.h2
    }
}
