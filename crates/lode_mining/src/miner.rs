//! # Vein Miner
//!
//! The single entry point. The game layer calls
//! [`VeinMiner::on_origin_block_broken`] for every broken block and
//! [`VeinMiner::tick`] once per server tick.

use std::sync::Arc;

use lode_economy::{FixedPoint, Tool};
use lode_shared::{BlockId, BlockPos, BlockRegistry};

use crate::classifier::OreClassifier;
use crate::config::VeinConfig;
use crate::cost::{CostGate, Reservation};
use crate::error::MiningResult;
use crate::hooks::{ActorId, MiningHooks};
use crate::scheduler::BreakScheduler;
use crate::search::VeinSearch;
use crate::session::{BreakSession, SessionId, VeinReport};

/// What an origin break led to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum Activation {
    /// The block cannot start a vein.
    Ineligible,
    /// The actor's previous vein is still running.
    Busy,
    /// The actor could not pay. No block beyond the origin was touched.
    Declined {
        /// Positions the search found
        discovered: u32,
        /// Price asked
        cost: FixedPoint,
    },
    /// The vein was broken during the call.
    Completed(VeinReport),
    /// The vein is queued and breaks over the coming ticks.
    Scheduled {
        /// Session to watch for
        session: SessionId,
        /// Jobs queued
        jobs: u32,
    },
}

/// Vein mining: classifier, search, cost gate and scheduler together.
#[derive(Debug)]
pub struct VeinMiner {
    config: VeinConfig,
    classifier: OreClassifier,
    search: VeinSearch,
    gate: CostGate,
    scheduler: BreakScheduler,
}

impl VeinMiner {
    /// Builds a miner. Depth variants must already be linked in `registry`.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or names unknown blocks.
    pub fn new(config: VeinConfig, registry: Arc<BlockRegistry>) -> MiningResult<Self> {
        config.validate()?;
        let eligible = config.eligible_ids(&registry)?;
        let classifier = OreClassifier::new(registry, eligible);

        tracing::info!(
            "Vein miner ready: {} eligible blocks, max {} blocks within {}, {:?} mode",
            classifier.eligible_count(),
            config.max_blocks,
            config.max_range,
            config.mode
        );

        Ok(Self {
            search: VeinSearch::new(config.budget()),
            gate: CostGate::new(config.per_block_cost, config.weight_scaling),
            scheduler: BreakScheduler::new(config.mode, config.step_delay_ticks),
            classifier,
            config,
        })
    }

    /// Reacts to `actor` breaking `origin_type` at `origin` on tick `now`.
    ///
    /// The origin block is expected to be gone already; it is never read,
    /// charged for, or broken again.
    pub fn on_origin_block_broken(
        &mut self,
        origin: BlockPos,
        origin_type: BlockId,
        actor: ActorId,
        tool: Tool,
        now: u64,
        hooks: &mut MiningHooks<'_>,
    ) -> Activation {
        if !self.classifier.is_eligible(origin_type) {
            return Activation::Ineligible;
        }
        if self.scheduler.is_busy(actor) {
            tracing::debug!("Entity {} already mining a vein, ignoring {}", actor, origin);
            return Activation::Busy;
        }

        let matcher = self.classifier.matcher(origin_type);
        let targets = self
            .search
            .search(origin, &*hooks.world, |block| matcher.matches(block));
        let discovered = targets.len() as u32;

        let cost = match self
            .gate
            .try_reserve(targets.len(), actor, hooks.weight, hooks.ledger)
        {
            Reservation::Granted { cost } => cost,
            Reservation::Declined { cost } => {
                return Activation::Declined { discovered, cost };
            }
        };

        tracing::debug!(
            "Entity {} mining {} vein at {}: {} blocks for {} stamina",
            actor,
            self.classifier.registry().name(origin_type),
            origin,
            discovered,
            cost
        );

        let session = BreakSession::new(
            self.scheduler.allocate_id(),
            actor,
            origin,
            tool,
            matcher,
            targets,
        )
        .with_cost(cost)
        .with_trail_particles(self.config.trail_particles)
        .with_tool_policy(self.config.on_tool_break);
        let id = session.id();

        match self.scheduler.start(session, now, hooks) {
            Some(report) => Activation::Completed(report),
            None => Activation::Scheduled {
                session: id,
                jobs: discovered,
            },
        }
    }

    /// Advances cascades to tick `now`. Returns finished sessions.
    pub fn tick(&mut self, now: u64, hooks: &mut MiningHooks<'_>) -> Vec<VeinReport> {
        self.scheduler.tick(now, hooks)
    }

    /// Stops the actor's vein, e.g. on disconnect.
    pub fn cancel_actor(
        &mut self,
        actor: ActorId,
        hooks: &mut MiningHooks<'_>,
    ) -> Option<VeinReport> {
        self.scheduler.cancel_actor(actor, hooks)
    }

    /// Stops every vein.
    pub fn shutdown(&mut self, hooks: &mut MiningHooks<'_>) -> Vec<VeinReport> {
        let reports = self.scheduler.cancel_all(hooks);
        if !reports.is_empty() {
            tracing::info!("Vein miner stopped {} sessions on shutdown", reports.len());
        }
        reports
    }

    /// Whether `actor` has a vein in flight.
    #[must_use]
    pub fn is_busy(&self, actor: ActorId) -> bool {
        self.scheduler.is_busy(actor)
    }

    /// Veins in flight.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.scheduler.active_sessions()
    }

    /// The classifier.
    #[must_use]
    pub const fn classifier(&self) -> &OreClassifier {
        &self.classifier
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &VeinConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;
    use crate::testkit::{Fixture, COAL_ITEM};

    fn miner(fixture: &Fixture, mode: ExecutionMode) -> VeinMiner {
        let config = VeinConfig {
            mode,
            eligible: vec!["coal_ore".into()],
            ..VeinConfig::default()
        };
        VeinMiner::new(config, Arc::clone(&fixture.registry)).unwrap()
    }

    #[test]
    fn test_ineligible_is_noop() {
        let mut fixture = Fixture::new(100);
        fixture.line(3);
        let mut m = miner(&fixture, ExecutionMode::Instant);
        let stone = fixture.stone;
        let tool = fixture.tool;

        let outcome =
            m.on_origin_block_broken(BlockPos::ORIGIN, stone, 1, tool, 0, &mut fixture.hooks());
        assert_eq!(outcome, Activation::Ineligible);
        assert!(fixture.world.removed.is_empty());
        assert_eq!(fixture.balance(), FixedPoint::from_whole(1000));
    }

    #[test]
    fn test_three_neighbors_instant() {
        let mut fixture = Fixture::new(100);
        fixture.line(3);
        let mut m = miner(&fixture, ExecutionMode::Instant);
        let (ore, tool) = (fixture.ore, fixture.tool);

        let outcome =
            m.on_origin_block_broken(BlockPos::ORIGIN, ore, 1, tool, 0, &mut fixture.hooks());
        let Activation::Completed(report) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(report.discovered, 3);
        assert_eq!(report.broken, 3);
        assert_eq!(report.cost, FixedPoint::from_parts(1, 500_000));
        assert_eq!(fixture.spawner.spawned.len(), 3);
        assert!(fixture
            .spawner
            .spawned
            .iter()
            .all(|&(at, stack)| at == BlockPos::ORIGIN && stack.item_id == COAL_ITEM));
    }

    #[test]
    fn test_declined_touches_nothing() {
        let mut fixture = Fixture::new(100);
        fixture.line(50);
        // Range 16 finds 16 of them: 16 × 0.5 = 8 > 5.
        *fixture.ledger.balance.borrow_mut() = FixedPoint::from_whole(5);
        let mut m = miner(&fixture, ExecutionMode::Instant);
        let (ore, tool) = (fixture.ore, fixture.tool);

        let outcome =
            m.on_origin_block_broken(BlockPos::ORIGIN, ore, 1, tool, 0, &mut fixture.hooks());
        assert_eq!(
            outcome,
            Activation::Declined {
                discovered: 16,
                cost: FixedPoint::from_whole(8),
            }
        );
        assert!(fixture.world.removed.is_empty());
        assert_eq!(fixture.balance(), FixedPoint::from_whole(5));
        assert_eq!(fixture.resolver.calls.get(), 0);
    }

    #[test]
    fn test_busy_while_cascading() {
        let mut fixture = Fixture::new(100);
        fixture.line(3);
        let mut m = miner(&fixture, ExecutionMode::Cascade);
        let (ore, tool) = (fixture.ore, fixture.tool);

        let first =
            m.on_origin_block_broken(BlockPos::ORIGIN, ore, 1, tool, 0, &mut fixture.hooks());
        assert!(matches!(first, Activation::Scheduled { jobs: 3, .. }));
        assert!(m.is_busy(1));

        let second = m.on_origin_block_broken(
            BlockPos::new(50, 0, 0),
            ore,
            1,
            tool,
            0,
            &mut fixture.hooks(),
        );
        assert_eq!(second, Activation::Busy);

        let done = m.tick(3, &mut fixture.hooks());
        assert_eq!(done.len(), 1);
        assert!(!m.is_busy(1));
    }

    #[test]
    fn test_isolated_ore_completes_empty() {
        let mut fixture = Fixture::new(100);
        let mut m = miner(&fixture, ExecutionMode::Cascade);
        let (ore, tool) = (fixture.ore, fixture.tool);

        let outcome =
            m.on_origin_block_broken(BlockPos::ORIGIN, ore, 1, tool, 0, &mut fixture.hooks());
        let Activation::Completed(report) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert_eq!(report.discovered, 0);
        assert_eq!(report.cost, FixedPoint::ZERO);
        assert_eq!(m.active_sessions(), 0);
    }

    #[test]
    fn test_rejects_unknown_eligible_block() {
        let fixture = Fixture::new(100);
        let config = VeinConfig {
            eligible: vec!["unobtainium".into()],
            ..VeinConfig::default()
        };
        assert!(VeinMiner::new(config, Arc::clone(&fixture.registry)).is_err());
    }
}
