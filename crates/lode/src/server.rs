//! # Mining Server
//!
//! Handles player block breaks and drives vein cascades from the tick.
//!
//! ## Flow
//!
//! 1. A player breaks a block: the server removes it, spawns its own drops
//!    and wears the tool, exactly as for any block.
//! 2. The vein miner is told about the break and may take the rest of the
//!    vein, charging stamina up front.
//! 3. Each tick advances every cascade. Finished veins are announced with
//!    [`GameEvent::VeinFinished`].

use std::sync::Arc;

use lode_economy::{EntityId, LootTables, TheBank, ToolCondition};
use lode_mining::{
    Activation, BlockAccess, ItemSpawner, MiningHooks, MiningResult, ToolWear, VeinConfig,
    VeinMiner, VeinReport,
};
use lode_shared::{BlockId, BlockPos, BlockRegistry};

use crate::events::{EventSender, GameEvent};
use crate::world::BlockWorld;

/// The authoritative mining server.
pub struct MiningServer {
    registry: Arc<BlockRegistry>,
    world: BlockWorld,
    bank: Arc<TheBank>,
    loot: LootTables,
    miner: VeinMiner,
    items: EventSender,
    effects: EventSender,
    tick: u64,
}

impl MiningServer {
    /// Builds a server over an empty world.
    ///
    /// # Errors
    ///
    /// Fails if the vein configuration is invalid for `registry`.
    pub fn new(
        config: VeinConfig,
        registry: Arc<BlockRegistry>,
        loot: LootTables,
        bank: Arc<TheBank>,
        events: EventSender,
    ) -> MiningResult<Self> {
        let miner = VeinMiner::new(config, Arc::clone(&registry))?;
        Ok(Self {
            registry,
            world: BlockWorld::new().with_events(events.clone()),
            bank,
            loot,
            miner,
            items: events.clone(),
            effects: events,
            tick: 0,
        })
    }

    /// The world.
    #[must_use]
    pub const fn world(&self) -> &BlockWorld {
        &self.world
    }

    /// The world, for editing.
    pub fn world_mut(&mut self) -> &mut BlockWorld {
        &mut self.world
    }

    /// The bank.
    #[must_use]
    pub fn bank(&self) -> &TheBank {
        &self.bank
    }

    /// The block registry.
    #[must_use]
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// The vein miner.
    #[must_use]
    pub const fn miner(&self) -> &VeinMiner {
        &self.miner
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    fn parts(&mut self) -> (&mut VeinMiner, MiningHooks<'_>) {
        let hooks = MiningHooks {
            world: &mut self.world,
            drops: &self.loot,
            ledger: &*self.bank,
            weight: &*self.bank,
            tools: &*self.bank,
            spawner: &mut self.items,
            effects: &mut self.effects,
        };
        (&mut self.miner, hooks)
    }

    /// A player broke the block at `pos` with whatever they hold.
    pub fn break_block(&mut self, actor: EntityId, pos: BlockPos) -> Activation {
        let block = self.world.block_at(pos);
        if block.is_air() {
            return Activation::Ineligible;
        }

        let tool = self.bank.held_tool(actor);
        let drops = self.loot.roll(block, pos, &tool);
        self.world.set_block(pos, BlockId::AIR);
        self.items.send(GameEvent::BlockBroken {
            entity_id: actor,
            pos,
            block,
        });
        for stack in drops {
            if !self.items.spawn_item(pos, stack) {
                tracing::warn!("Drop {:?} at {} was not spawned", stack, pos);
            }
        }
        match ToolWear::wear(&*self.bank, actor, &tool, 1) {
            ToolCondition::Intact { .. } => {}
            ToolCondition::Broken => {
                tracing::debug!("Entity {} broke tool {} on {}", actor, tool.id, pos);
            }
            ToolCondition::Missing => {
                tracing::debug!("Entity {} no longer holds tool {}", actor, tool.id);
            }
        }

        // The origin break may have broken the tool.
        let tool = self.bank.held_tool(actor);
        let now = self.tick;
        let (miner, mut hooks) = self.parts();
        let outcome = miner.on_origin_block_broken(pos, block, actor, tool, now, &mut hooks);

        match outcome {
            Activation::Completed(report) => self.announce(report),
            Activation::Declined { discovered, cost } => {
                tracing::debug!(
                    "Entity {} declined vein of {} at {}: needs {} stamina",
                    actor,
                    discovered,
                    pos,
                    cost
                );
            }
            Activation::Ineligible | Activation::Busy | Activation::Scheduled { .. } => {}
        }
        outcome
    }

    /// Runs one tick. Returns veins that finished during it.
    pub fn run_tick(&mut self) -> Vec<VeinReport> {
        self.tick += 1;
        let now = self.tick;
        let (miner, mut hooks) = self.parts();
        let reports = miner.tick(now, &mut hooks);
        for report in &reports {
            self.announce(*report);
        }
        reports
    }

    /// A player left. Their vein stops and its loot is spawned.
    pub fn disconnect(&mut self, actor: EntityId) -> Option<VeinReport> {
        let (miner, mut hooks) = self.parts();
        let report = miner.cancel_actor(actor, &mut hooks)?;
        self.announce(report);
        Some(report)
    }

    /// Stops every vein.
    pub fn shutdown(&mut self) -> Vec<VeinReport> {
        let (miner, mut hooks) = self.parts();
        let reports = miner.shutdown(&mut hooks);
        for report in &reports {
            self.announce(*report);
        }
        reports
    }

    fn announce(&self, report: VeinReport) {
        tracing::info!(
            "Vein {} of entity {} finished: {} broken, {} skipped, {} items",
            report.session,
            report.actor,
            report.broken,
            report.skipped,
            report.items_spawned
        );
        self.effects.send(GameEvent::VeinFinished(report));
    }
}
