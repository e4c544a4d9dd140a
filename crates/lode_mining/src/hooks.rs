//! # Collaborator Traits
//!
//! The vein miner never touches the world, the loot tables or an entity
//! directly. Everything goes through these traits, bundled per call in
//! [`MiningHooks`].
//!
//! ```text
//! ┌──────────────┐   BlockAccess    ┌──────────────┐
//! │              │ ───────────────> │    World     │
//! │              │   DropResolver   ├──────────────┤
//! │  VeinMiner   │ ───────────────> │  LootTables  │
//! │              │   StaminaLedger  ├──────────────┤
//! │              │   WeightProvider │   TheBank    │
//! │              │   ToolWear       │              │
//! │              │ ───────────────> ├──────────────┤
//! │              │   ItemSpawner    │   Events     │
//! │              │   EffectSink     │              │
//! └──────────────┘ ───────────────> └──────────────┘
//! ```
//!
//! The economy implementations live here; world and event
//! implementations belong to the server.

use lode_economy::{EntityId, FixedPoint, ItemStack, LootTables, TheBank, Tool, ToolCondition};
use lode_shared::{BlockId, BlockPos, ParticleKind, SoundKind, Vec3};

/// The entity that broke the origin block.
pub type ActorId = EntityId;

/// Handle to a block entity (chest, furnace, spawner).
pub type BlockEntityId = u64;

/// Read and remove blocks in the world.
pub trait BlockAccess {
    /// Block type at a position. Unloaded positions read as air.
    fn block_at(&self, pos: BlockPos) -> BlockId;

    /// Replaces the block at a position with air.
    fn remove_block(&mut self, pos: BlockPos);

    /// Block entity attached to a position, if any.
    fn block_entity(&self, pos: BlockPos) -> Option<BlockEntityId>;
}

/// Computes what a broken block drops.
pub trait DropResolver {
    /// Drops for `block` at `pos`, broken by `actor` using `tool`.
    ///
    /// May be empty. Calls are independent: the miner copies the result.
    fn resolve_drops(&self, block: BlockId, pos: BlockPos, actor: ActorId, tool: &Tool)
        -> Vec<ItemStack>;
}

/// Stamina accounting.
pub trait StaminaLedger {
    /// Debits `amount` if the actor can afford it, in one atomic step.
    fn try_debit(&self, actor: ActorId, amount: FixedPoint) -> bool;
}

/// Carried-weight penalty.
pub trait WeightProvider {
    /// Penalty in `[0, ∞)`. 0 means unencumbered.
    fn weight_penalty(&self, actor: ActorId) -> FixedPoint;
}

/// Tool durability.
pub trait ToolWear {
    /// Whether `tool` is still in the actor's hand. The bare hand always is.
    fn is_held(&self, actor: ActorId, tool: &Tool) -> bool;

    /// Wears `tool` by `amount` and reports what is left.
    ///
    /// Only that tool instance takes wear. If the actor no longer holds it
    /// the result is [`ToolCondition::Missing`] and nothing is worn.
    fn wear(&self, actor: ActorId, tool: &Tool, amount: u32) -> ToolCondition;
}

/// Puts item entities into the world.
pub trait ItemSpawner {
    /// Spawns one item entity holding `stack` at `at`.
    ///
    /// Returns false if the item could not be placed.
    fn spawn_item(&mut self, at: BlockPos, stack: ItemStack) -> bool;
}

/// Fire-and-forget audiovisual feedback.
pub trait EffectSink {
    /// Particles at a point.
    fn particles(&mut self, kind: ParticleKind, at: Vec3, count: u32);

    /// A sound at a point.
    fn sound(&mut self, kind: SoundKind, at: Vec3);
}

/// Borrowed collaborators for one call into the miner.
pub struct MiningHooks<'a> {
    /// World blocks
    pub world: &'a mut dyn BlockAccess,
    /// Loot
    pub drops: &'a dyn DropResolver,
    /// Stamina
    pub ledger: &'a dyn StaminaLedger,
    /// Carried weight
    pub weight: &'a dyn WeightProvider,
    /// Tool durability
    pub tools: &'a dyn ToolWear,
    /// Item entities
    pub spawner: &'a mut dyn ItemSpawner,
    /// Particles and sounds
    pub effects: &'a mut dyn EffectSink,
}

// ============================================================================
// Economy implementations
// ============================================================================

impl StaminaLedger for TheBank {
    fn try_debit(&self, actor: ActorId, amount: FixedPoint) -> bool {
        self.try_debit_stamina(actor, amount)
    }
}

impl WeightProvider for TheBank {
    fn weight_penalty(&self, actor: ActorId) -> FixedPoint {
        TheBank::weight_penalty(self, actor)
    }
}

impl ToolWear for TheBank {
    fn is_held(&self, actor: ActorId, tool: &Tool) -> bool {
        tool.is_bare_hand() || self.holds_tool(actor, tool.id)
    }

    fn wear(&self, actor: ActorId, tool: &Tool, amount: u32) -> ToolCondition {
        if tool.is_bare_hand() {
            return ToolCondition::Intact { remaining: 0 };
        }
        match self.wear_tool(actor, tool.id, amount) {
            Ok(condition) => condition,
            Err(err) => {
                tracing::debug!("Tool wear for entity {} skipped: {}", actor, err);
                ToolCondition::Missing
            }
        }
    }
}

impl DropResolver for LootTables {
    fn resolve_drops(
        &self,
        block: BlockId,
        pos: BlockPos,
        _actor: ActorId,
        tool: &Tool,
    ) -> Vec<ItemStack> {
        self.roll(block, pos, tool)
    }
}
