//! # Break Scheduler
//!
//! Owns every executing session and drives them from the server tick.
//!
//! ## Cascade Timing
//!
//! A session activated on tick `T` fires job `i` on tick
//! `T + delay × (i + 1)`. If the server falls behind, the next tick fires
//! every job that came due, still one at a time and in index order.
//!
//! ## Isolation
//!
//! Sessions never share state. Within a session, job `i + 1` only starts
//! after job `i` has returned. One actor holds at most one session.

use std::collections::{BTreeMap, HashMap};

use crate::config::ExecutionMode;
use crate::hooks::{ActorId, MiningHooks};
use crate::session::{BreakSession, SessionId, SessionState, VeinReport};

/// Runs break sessions, instantly or across ticks.
#[derive(Debug)]
pub struct BreakScheduler {
    mode: ExecutionMode,
    step_delay: u64,
    sessions: BTreeMap<SessionId, BreakSession>,
    by_actor: HashMap<ActorId, SessionId>,
    next_id: u64,
}

impl BreakScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new(mode: ExecutionMode, step_delay_ticks: u32) -> Self {
        Self {
            mode,
            step_delay: u64::from(step_delay_ticks.max(1)),
            sessions: BTreeMap::new(),
            by_actor: HashMap::new(),
            next_id: 1,
        }
    }

    /// Execution mode.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Hands out the next session id.
    pub fn allocate_id(&mut self) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Whether `actor` has a session in flight.
    #[must_use]
    pub fn is_busy(&self, actor: ActorId) -> bool {
        self.by_actor.contains_key(&actor)
    }

    /// Sessions in flight.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Looks up a session in flight.
    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<&BreakSession> {
        self.sessions.get(&id)
    }

    /// Starts a granted session on tick `now`.
    ///
    /// Returns the report if the session finished during the call (instant
    /// mode, or no jobs), `None` if it was queued for later ticks.
    pub fn start(
        &mut self,
        mut session: BreakSession,
        now: u64,
        hooks: &mut MiningHooks<'_>,
    ) -> Option<VeinReport> {
        session.begin(now, self.step_delay);

        if self.mode == ExecutionMode::Instant {
            while session.fire_next(hooks).is_some() {}
        }
        if session.is_exhausted() {
            return Some(session.complete(hooks, false));
        }

        self.by_actor.insert(session.actor(), session.id());
        self.sessions.insert(session.id(), session);
        None
    }

    /// Fires every job due on or before `now`.
    ///
    /// Returns the reports of sessions that finished.
    pub fn tick(&mut self, now: u64, hooks: &mut MiningHooks<'_>) -> Vec<VeinReport> {
        let mut finished = Vec::new();

        for session in self.sessions.values_mut() {
            while session.next_due_tick().is_some_and(|due| due <= now) {
                if session.fire_next(hooks).is_none() {
                    break;
                }
            }
            if session.is_exhausted() {
                finished.push(session.complete(hooks, false));
            }
        }

        if !finished.is_empty() {
            self.sessions
                .retain(|_, session| session.state() != SessionState::Completed);
            for report in &finished {
                self.by_actor.remove(&report.actor);
            }
        }
        finished
    }

    /// Stops the actor's session, spawning whatever it collected.
    pub fn cancel_actor(
        &mut self,
        actor: ActorId,
        hooks: &mut MiningHooks<'_>,
    ) -> Option<VeinReport> {
        let id = self.by_actor.remove(&actor)?;
        let mut session = self.sessions.remove(&id)?;
        let report = session.complete(hooks, true);
        tracing::debug!(
            "Session {} of entity {} cancelled with {} jobs unfired",
            id,
            actor,
            report.unfired()
        );
        Some(report)
    }

    /// Stops every session. Used on shutdown.
    pub fn cancel_all(&mut self, hooks: &mut MiningHooks<'_>) -> Vec<VeinReport> {
        self.by_actor.clear();
        std::mem::take(&mut self.sessions)
            .into_values()
            .map(|mut session| session.complete(hooks, true))
            .collect()
    }
}
