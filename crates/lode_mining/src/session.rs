//! # Break Sessions
//!
//! One session per granted activation. It owns the ordered job list, the
//! drop accumulator and the actor's tool snapshot, and runs one step at a
//! time:
//!
//! ```text
//! ┌──────┐  begin   ┌───────────┐  last job / halt / cancel  ┌───────────┐
//! │ Idle │ ───────> │ Executing │ ─────────────────────────> │ Completed │
//! └──────┘          └───────────┘                            └───────────┘
//!                    fire_next() × N
//! ```
//!
//! A step re-reads the world first. A target that is gone, replaced, or
//! now carries a block entity is skipped without side effects.
//!
//! The tool snapshot is checked against the actor's hand before every
//! step. Once the snapshot tool is broken or no longer held, the session's
//! [`ToolBreakPolicy`] decides: stop, or carry on bare-handed.

use std::fmt;

use lode_economy::{FixedPoint, Tool, ToolCondition};
use lode_shared::{BlockPos, ParticleKind, SoundKind};

use crate::classifier::VeinMatcher;
use crate::config::ToolBreakPolicy;
use crate::drops::DropConsolidator;
use crate::hooks::{ActorId, MiningHooks};

/// Debris particles per removed block.
const CRACK_PARTICLES: u32 = 12;

/// Highest break-progress stage.
const MAX_PROGRESS_STAGE: u32 = 9;

/// Session identifier, unique per miner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vein#{}", self.0)
    }
}

/// One block to break. Immutable once created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BreakJob {
    /// Position to break
    pub target: BlockPos,
    /// Position in the session's order, from 0
    pub index: u32,
}

/// Session lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Built, not started.
    Idle,
    /// Jobs are firing.
    Executing,
    /// Drops spawned. Terminal.
    Completed,
}

/// What one fired job did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Block broken and its drops collected.
    Broken,
    /// Target gone or protected. Nothing happened.
    Skipped,
    /// The tool broke or left the hand and the session stops. A broken
    /// tool still broke this block; a tool found missing before the step
    /// did not.
    Halted,
}

/// Final account of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VeinReport {
    /// Session
    pub session: SessionId,
    /// Who mined
    pub actor: ActorId,
    /// Origin block position
    pub origin: BlockPos,
    /// Positions the search returned
    pub discovered: u32,
    /// Blocks removed
    pub broken: u32,
    /// Jobs skipped because the target changed
    pub skipped: u32,
    /// Item entities spawned at the origin
    pub stacks_spawned: u32,
    /// Items across those entities
    pub items_spawned: u64,
    /// Drop stacks the spawner refused
    pub stacks_lost: u32,
    /// Stamina paid
    pub cost: FixedPoint,
    /// The tool broke during the session
    pub tool_broke: bool,
    /// The tool left the actor's hand during the session
    pub tool_lost: bool,
    /// Stopped early by cancellation
    pub cancelled: bool,
}

impl VeinReport {
    /// Jobs that never fired.
    #[must_use]
    pub const fn unfired(&self) -> u32 {
        self.discovered
            .saturating_sub(self.broken)
            .saturating_sub(self.skipped)
    }
}

/// An executing vein.
#[derive(Debug)]
pub struct BreakSession {
    id: SessionId,
    actor: ActorId,
    origin: BlockPos,
    tool: Tool,
    matcher: VeinMatcher,
    jobs: Vec<BreakJob>,
    next: usize,
    halted: bool,
    drops: DropConsolidator,
    state: SessionState,
    activated_at: u64,
    step_delay: u64,
    trail_particles: u32,
    on_tool_break: ToolBreakPolicy,
    report: VeinReport,
}

impl BreakSession {
    /// Builds an idle session over `targets`, in order.
    #[must_use]
    pub fn new(
        id: SessionId,
        actor: ActorId,
        origin: BlockPos,
        tool: Tool,
        matcher: VeinMatcher,
        targets: Vec<BlockPos>,
    ) -> Self {
        let jobs: Vec<BreakJob> = targets
            .into_iter()
            .enumerate()
            .map(|(index, target)| BreakJob {
                target,
                index: index as u32,
            })
            .collect();

        let report = VeinReport {
            session: id,
            actor,
            origin,
            discovered: jobs.len() as u32,
            broken: 0,
            skipped: 0,
            stacks_spawned: 0,
            items_spawned: 0,
            stacks_lost: 0,
            cost: FixedPoint::ZERO,
            tool_broke: false,
            tool_lost: false,
            cancelled: false,
        };

        Self {
            id,
            actor,
            origin,
            tool,
            matcher,
            jobs,
            next: 0,
            halted: false,
            drops: DropConsolidator::new(),
            state: SessionState::Idle,
            activated_at: 0,
            step_delay: 1,
            trail_particles: 0,
            on_tool_break: ToolBreakPolicy::Abort,
            report,
        }
    }

    /// Records the stamina paid for this session.
    #[must_use]
    pub const fn with_cost(mut self, cost: FixedPoint) -> Self {
        self.report.cost = cost;
        self
    }

    /// Trail particles emitted per step.
    #[must_use]
    pub const fn with_trail_particles(mut self, count: u32) -> Self {
        self.trail_particles = count;
        self
    }

    /// Tool break handling.
    #[must_use]
    pub const fn with_tool_policy(mut self, policy: ToolBreakPolicy) -> Self {
        self.on_tool_break = policy;
        self
    }

    /// Moves to `Executing`. Job `i` is due `step_delay × (i + 1)` ticks after `now`.
    pub fn begin(&mut self, now: u64, step_delay: u64) {
        debug_assert_eq!(self.state, SessionState::Idle);
        self.activated_at = now;
        self.step_delay = step_delay;
        self.state = SessionState::Executing;
        tracing::debug!(
            "Session {} started at {} with {} jobs",
            self.id,
            self.origin,
            self.jobs.len()
        );
    }

    /// Session id.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Who mined.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Origin block position.
    #[must_use]
    pub const fn origin(&self) -> BlockPos {
        self.origin
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// All jobs in firing order.
    #[must_use]
    pub fn jobs(&self) -> &[BreakJob] {
        &self.jobs
    }

    /// Running totals.
    #[must_use]
    pub const fn report(&self) -> &VeinReport {
        &self.report
    }

    /// The next job to fire.
    #[must_use]
    pub fn next_job(&self) -> Option<BreakJob> {
        if self.halted {
            return None;
        }
        self.jobs.get(self.next).copied()
    }

    /// Tick the next job is due on.
    #[must_use]
    pub fn next_due_tick(&self) -> Option<u64> {
        self.next_job().map(|job| {
            self.activated_at
                .saturating_add(self.step_delay.saturating_mul(u64::from(job.index) + 1))
        })
    }

    /// No job left to fire.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.next_job().is_none()
    }

    /// Fires the next job.
    ///
    /// Returns `None` when there is nothing left to fire.
    pub fn fire_next(&mut self, hooks: &mut MiningHooks<'_>) -> Option<StepOutcome> {
        if self.state != SessionState::Executing {
            return None;
        }
        let job = self.next_job()?;
        self.next += 1;

        let block = hooks.world.block_at(job.target);
        if block.is_air() || !self.matcher.matches(block) {
            tracing::trace!("Session {}: {} vanished, skipping", self.id, job.target);
            self.report.skipped += 1;
            return Some(StepOutcome::Skipped);
        }
        if let Some(entity) = hooks.world.block_entity(job.target) {
            tracing::trace!(
                "Session {}: {} carries block entity {}, skipping",
                self.id,
                job.target,
                entity
            );
            self.report.skipped += 1;
            return Some(StepOutcome::Skipped);
        }

        if !hooks.tools.is_held(self.actor, &self.tool) && !self.give_up_tool(job, false) {
            return Some(StepOutcome::Halted);
        }

        let stacks = hooks
            .drops
            .resolve_drops(block, job.target, self.actor, &self.tool);
        self.drops.accumulate(&stacks);
        hooks.world.remove_block(job.target);
        self.report.broken += 1;

        let condition = hooks.tools.wear(self.actor, &self.tool, 1);
        self.emit_step_effects(job, hooks);

        let keep_going = match condition {
            ToolCondition::Intact { remaining } => {
                if !self.tool.is_bare_hand() {
                    self.tool.durability = remaining;
                }
                true
            }
            ToolCondition::Broken => self.give_up_tool(job, true),
            ToolCondition::Missing => self.give_up_tool(job, false),
        };
        Some(if keep_going {
            StepOutcome::Broken
        } else {
            StepOutcome::Halted
        })
    }

    /// Applies the tool policy once the snapshot tool is unusable.
    ///
    /// Returns true if the session continues bare-handed.
    fn give_up_tool(&mut self, job: BreakJob, broke: bool) -> bool {
        let what = if broke {
            self.report.tool_broke = true;
            "broke"
        } else {
            self.report.tool_lost = true;
            "left the hand"
        };
        match self.on_tool_break {
            ToolBreakPolicy::Abort => {
                tracing::debug!(
                    "Session {}: tool {} {} at job {}, stopping",
                    self.id,
                    self.tool.id,
                    what,
                    job.index
                );
                self.halted = true;
                false
            }
            ToolBreakPolicy::BareHand => {
                tracing::debug!(
                    "Session {}: tool {} {} at job {}, continuing bare-handed",
                    self.id,
                    self.tool.id,
                    what,
                    job.index
                );
                self.tool = Tool::bare_hand();
                true
            }
        }
    }

    fn emit_step_effects(&self, job: BreakJob, hooks: &mut MiningHooks<'_>) {
        let from = self.origin.center();
        let to = job.target.center();

        let steps = self.trail_particles;
        for k in 1..=steps {
            let t = k as f32 / (steps + 1) as f32;
            hooks
                .effects
                .particles(ParticleKind::Trail, from.lerp(to, t), 1);
        }

        let total = self.jobs.len() as u32;
        let stage = ((job.index + 1) * MAX_PROGRESS_STAGE / total.max(1)) as u8;
        hooks
            .effects
            .particles(ParticleKind::BreakProgress { stage }, to, 1);
        hooks
            .effects
            .particles(ParticleKind::BlockCrack, to, CRACK_PARTICLES);
        hooks.effects.sound(SoundKind::BlockBreak, to);
    }

    /// Drains the drops at the origin and moves to `Completed`.
    ///
    /// `cancelled` marks a session stopped before its last job. Completing
    /// twice returns the same report without spawning again.
    pub fn complete(&mut self, hooks: &mut MiningHooks<'_>, cancelled: bool) -> VeinReport {
        if self.state == SessionState::Completed {
            return self.report;
        }

        // The spawn is the last thing a session does.
        if !self.drops.pending().is_empty() {
            hooks
                .effects
                .sound(SoundKind::VeinComplete, self.origin.center());
        }
        if let Some(summary) = self.drops.drain_and_spawn(self.origin, &mut *hooks.spawner) {
            self.report.stacks_spawned = summary.stacks;
            self.report.items_spawned = summary.items;
            self.report.stacks_lost = summary.lost;
        }

        self.report.cancelled = cancelled;
        self.state = SessionState::Completed;
        tracing::debug!(
            "Session {} completed: {} broken, {} skipped, {} stacks at {}",
            self.id,
            self.report.broken,
            self.report.skipped,
            self.report.stacks_spawned,
            self.origin
        );
        self.report
    }
}
