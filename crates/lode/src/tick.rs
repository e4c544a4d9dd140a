//! # Server Tick Loop
//!
//! Fixed-timestep clock at [`TICK_RATE`]. Vein cascades are measured in
//! ticks of this clock.
//!
//! If a tick overruns, the missed ticks are run back to back, up to
//! `max_catch_up`. Anything beyond that is dropped so a stall cannot turn
//! into a spiral.

use std::time::{Duration, Instant};

use lode_shared::TICK_RATE;

/// Ticks run back to back after a stall before time is dropped.
const DEFAULT_MAX_CATCH_UP: u32 = 5;

/// Fixed-timestep tick loop controller.
pub struct TickLoop {
    tick_duration: Duration,
    last_poll: Instant,
    accumulator: Duration,
    tick_count: u64,
    max_catch_up: u32,
    stats: TickStats,
}

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickStats {
    /// Shortest tick in microseconds.
    pub min_tick_us: u64,
    /// Longest tick in microseconds.
    pub max_tick_us: u64,
    /// Rolling average in microseconds.
    pub avg_tick_us: u64,
    /// Ticks that took longer than their budget.
    pub late_ticks: u64,
    /// Ticks skipped after a stall.
    pub dropped_ticks: u64,
    /// Ticks measured.
    pub total_ticks: u64,
}

impl TickStats {
    fn fresh(budget_us: u64) -> Self {
        Self {
            min_tick_us: u64::MAX,
            avg_tick_us: budget_us,
            ..Self::default()
        }
    }
}

impl TickLoop {
    /// Creates a tick loop at `tick_rate` Hz.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        let tick_duration = Duration::from_micros(1_000_000 / u64::from(tick_rate.max(1)));
        Self {
            tick_duration,
            last_poll: Instant::now(),
            accumulator: Duration::ZERO,
            tick_count: 0,
            max_catch_up: DEFAULT_MAX_CATCH_UP,
            stats: TickStats::fresh(tick_duration.as_micros() as u64),
        }
    }

    /// Limits how many overdue ticks run back to back.
    #[must_use]
    pub fn with_max_catch_up(mut self, ticks: u32) -> Self {
        self.max_catch_up = ticks.max(1);
        self
    }

    /// Returns true while a tick is due.
    #[must_use]
    pub fn should_tick(&mut self) -> bool {
        let now = Instant::now();
        self.accumulator += now.duration_since(self.last_poll);
        self.last_poll = now;

        let limit = self.tick_duration * self.max_catch_up;
        if self.accumulator > limit {
            let excess = self.accumulator - limit;
            let dropped = excess.as_micros() / self.tick_duration.as_micros().max(1);
            self.stats.dropped_ticks += dropped as u64;
            tracing::warn!("Tick loop stalled, dropping {} ticks", dropped);
            self.accumulator = limit;
        }

        self.accumulator >= self.tick_duration
    }

    /// Starts a tick and returns its number, counting from 1.
    pub fn begin_tick(&mut self) -> (u64, Instant) {
        self.accumulator = self.accumulator.saturating_sub(self.tick_duration);
        self.tick_count += 1;
        (self.tick_count, Instant::now())
    }

    /// Ends a tick started at `start`.
    pub fn end_tick(&mut self, start: Instant) {
        let duration = start.elapsed();
        let duration_us = duration.as_micros() as u64;

        self.stats.total_ticks += 1;
        self.stats.min_tick_us = self.stats.min_tick_us.min(duration_us);
        self.stats.max_tick_us = self.stats.max_tick_us.max(duration_us);
        self.stats.avg_tick_us = (self.stats.avg_tick_us * 15 + duration_us) / 16;

        if duration > self.tick_duration {
            self.stats.late_ticks += 1;
            tracing::debug!(
                "Tick {} took {}us of {}us",
                self.tick_count,
                duration_us,
                self.tick_duration.as_micros()
            );
        }
    }

    /// Sleeps until the next tick is due.
    pub fn wait_for_next_tick(&self) {
        let elapsed = self.last_poll.elapsed() + self.accumulator;
        if elapsed < self.tick_duration {
            std::thread::sleep(self.tick_duration - elapsed);
        }
    }

    /// Ticks started so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Timing statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Length of one tick.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        self.tick_duration
    }
}

impl Default for TickLoop {
    fn default() -> Self {
        Self::new(TICK_RATE)
    }
}
