//! Recording collaborators for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Arc;

use lode_economy::{FixedPoint, ItemStack, Tool, ToolCondition};
use lode_shared::{BlockId, BlockPos, BlockRegistry, EffectEvent, ParticleKind, SoundKind, Vec3};

use crate::classifier::OreClassifier;
use crate::hooks::{
    ActorId, BlockAccess, BlockEntityId, DropResolver, EffectSink, ItemSpawner, MiningHooks,
    StaminaLedger, ToolWear, WeightProvider,
};

/// Coal drops per block.
pub const COAL_ITEM: u32 = 263;

#[derive(Default)]
pub struct FakeWorld {
    pub blocks: HashMap<BlockPos, BlockId>,
    pub entities: HashMap<BlockPos, BlockEntityId>,
    pub removed: Vec<BlockPos>,
}

impl BlockAccess for FakeWorld {
    fn block_at(&self, pos: BlockPos) -> BlockId {
        self.blocks.get(&pos).copied().unwrap_or(BlockId::AIR)
    }

    fn remove_block(&mut self, pos: BlockPos) {
        self.blocks.remove(&pos);
        self.removed.push(pos);
    }

    fn block_entity(&self, pos: BlockPos) -> Option<BlockEntityId> {
        self.entities.get(&pos).copied()
    }
}

/// One coal per block, recording the tool it was called with.
#[derive(Default)]
pub struct FakeLoot {
    pub calls: Cell<u32>,
    pub last_tool: Cell<Option<Tool>>,
}

impl DropResolver for FakeLoot {
    fn resolve_drops(
        &self,
        _block: BlockId,
        _pos: BlockPos,
        _actor: ActorId,
        tool: &Tool,
    ) -> Vec<ItemStack> {
        self.calls.set(self.calls.get() + 1);
        self.last_tool.set(Some(*tool));
        vec![ItemStack::new(COAL_ITEM, 1)]
    }
}

pub struct FakeLedger {
    pub balance: RefCell<FixedPoint>,
}

impl StaminaLedger for FakeLedger {
    fn try_debit(&self, _actor: ActorId, amount: FixedPoint) -> bool {
        let mut balance = self.balance.borrow_mut();
        match balance.checked_sub(amount) {
            Some(left) => {
                *balance = left;
                true
            }
            None => false,
        }
    }
}

pub struct FakeWeight(pub FixedPoint);

impl WeightProvider for FakeWeight {
    fn weight_penalty(&self, _actor: ActorId) -> FixedPoint {
        self.0
    }
}

/// A single tool in hand. `held = false` simulates a swap.
pub struct FakeTools {
    pub durability: Cell<u32>,
    pub held: Cell<bool>,
}

impl ToolWear for FakeTools {
    fn is_held(&self, _actor: ActorId, tool: &Tool) -> bool {
        tool.is_bare_hand() || self.held.get()
    }

    fn wear(&self, actor: ActorId, tool: &Tool, amount: u32) -> ToolCondition {
        if tool.is_bare_hand() {
            return ToolCondition::Intact { remaining: 0 };
        }
        if !self.is_held(actor, tool) {
            return ToolCondition::Missing;
        }
        let left = self.durability.get().saturating_sub(amount);
        self.durability.set(left);
        if left == 0 {
            ToolCondition::Broken
        } else {
            ToolCondition::Intact { remaining: left }
        }
    }
}

/// Records spawns. Refuses everything while `full` is set.
#[derive(Default)]
pub struct FakeSpawner {
    pub spawned: Vec<(BlockPos, ItemStack)>,
    pub full: bool,
}

impl ItemSpawner for FakeSpawner {
    fn spawn_item(&mut self, at: BlockPos, stack: ItemStack) -> bool {
        if self.full {
            return false;
        }
        self.spawned.push((at, stack));
        true
    }
}

#[derive(Default)]
pub struct FakeEffects {
    pub events: Vec<EffectEvent>,
}

impl EffectSink for FakeEffects {
    fn particles(&mut self, kind: ParticleKind, at: Vec3, count: u32) {
        self.events.push(EffectEvent::Particles { kind, at, count });
    }

    fn sound(&mut self, kind: SoundKind, at: Vec3) {
        self.events.push(EffectEvent::Sound { kind, at });
    }
}

/// A world of stone and coal with every collaborator recording.
pub struct Fixture {
    pub registry: Arc<BlockRegistry>,
    pub ore: BlockId,
    pub stone: BlockId,
    pub tool: Tool,
    pub world: FakeWorld,
    pub resolver: FakeLoot,
    pub ledger: FakeLedger,
    pub weight: FakeWeight,
    pub tools: FakeTools,
    pub spawner: FakeSpawner,
    pub effects: FakeEffects,
}

impl Fixture {
    /// Stamina 1000, no weight, a pickaxe with `durability`.
    pub fn new(durability: u32) -> Self {
        let registry = Arc::new(BlockRegistry::with_blocks(["stone", "coal_ore"], &[]));
        let ore = registry.id("coal_ore").unwrap();
        let stone = registry.id("stone").unwrap();
        Self {
            registry,
            ore,
            stone,
            tool: Tool::new(1, 257, durability),
            world: FakeWorld::default(),
            resolver: FakeLoot::default(),
            ledger: FakeLedger {
                balance: RefCell::new(FixedPoint::from_whole(1000)),
            },
            weight: FakeWeight(FixedPoint::ZERO),
            tools: FakeTools {
                durability: Cell::new(durability),
                held: Cell::new(true),
            },
            spawner: FakeSpawner::default(),
            effects: FakeEffects::default(),
        }
    }

    pub fn classifier(&self) -> OreClassifier {
        OreClassifier::new(Arc::clone(&self.registry), [self.ore])
    }

    /// Places `n` coal blocks along +x from the origin and returns them.
    pub fn line(&mut self, n: i32) -> Vec<BlockPos> {
        let positions: Vec<BlockPos> = (1..=n).map(|x| BlockPos::new(x, 0, 0)).collect();
        for &pos in &positions {
            self.world.blocks.insert(pos, self.ore);
        }
        positions
    }

    pub fn balance(&self) -> FixedPoint {
        *self.ledger.balance.borrow()
    }

    pub fn hooks(&mut self) -> MiningHooks<'_> {
        MiningHooks {
            world: &mut self.world,
            drops: &self.resolver,
            ledger: &self.ledger,
            weight: &self.weight,
            tools: &self.tools,
            spawner: &mut self.spawner,
            effects: &mut self.effects,
        }
    }
}
