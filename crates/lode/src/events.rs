//! # LODE Event System
//!
//! Everything the server tells clients goes through the event bus.
//!
//! ```text
//! ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//! │  VeinMiner  │─────>│ State chan  │──┐   │  Network /  │
//! │  BlockWorld │      ├─────────────┤  ├──>│  Sim output │
//! │             │─────>│ Effect chan │──┘   │             │
//! └─────────────┘      └─────────────┘      └─────────────┘
//! ```
//!
//! Block changes, item spawns and vein reports go through an unbounded
//! channel and are never dropped. Particles and sounds go through a bounded
//! channel: when it is full the effect is dropped and logged, so size it
//! for the worst tick. An instant 511-block vein emits a dozen effects per
//! block.
//!
//! Every event is stamped from one counter, and the receiver merges both
//! channels back into send order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use lode_economy::{EntityId, ItemStack};
use lode_mining::{EffectSink, ItemSpawner, VeinReport};
use lode_shared::{BlockId, BlockPos, EffectEvent, ParticleKind, SoundKind, Vec3};

/// Events the server emits.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// A player broke a block by hand.
    BlockBroken {
        /// Who broke it
        entity_id: EntityId,
        /// Where
        pos: BlockPos,
        /// What it was
        block: BlockId,
    },

    /// A block was removed by the server (vein mining).
    BlockRemoved {
        /// Where
        pos: BlockPos,
    },

    /// An item entity appeared in the world.
    ItemSpawned {
        /// Block the item sits on
        pos: BlockPos,
        /// Contents
        stack: ItemStack,
    },

    /// Particles or a sound.
    Effect(EffectEvent),

    /// A vein mining session ended.
    VeinFinished(VeinReport),
}

impl GameEvent {
    /// Whether the event is cosmetic and may be dropped under load.
    #[must_use]
    pub const fn is_effect(&self) -> bool {
        matches!(self, Self::Effect(_))
    }
}

type Stamped = (u64, GameEvent);

/// Event bus: lossless world state, bounded effects.
pub struct EventBus {
    state_tx: Sender<Stamped>,
    state_rx: Receiver<Stamped>,
    effect_tx: Sender<Stamped>,
    effect_rx: Receiver<Stamped>,
    sequence: Arc<AtomicU64>,
}

impl EventBus {
    /// Creates a new event bus holding up to `effect_capacity` effects in
    /// flight.
    #[must_use]
    pub fn new(effect_capacity: usize) -> Self {
        let (state_tx, state_rx) = unbounded();
        let (effect_tx, effect_rx) = bounded(effect_capacity);
        Self {
            state_tx,
            state_rx,
            effect_tx,
            effect_rx,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a sender handle.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            state: self.state_tx.clone(),
            effects: self.effect_tx.clone(),
            sequence: Arc::clone(&self.sequence),
        }
    }

    /// Creates a receiver handle.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            state: self.state_rx.clone(),
            effects: self.effect_rx.clone(),
        }
    }

    /// Creates a sender and receiver pair.
    #[must_use]
    pub fn create_pair(effect_capacity: usize) -> (EventSender, EventReceiver) {
        let bus = Self::new(effect_capacity);
        (bus.sender(), bus.receiver())
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    state: Sender<Stamped>,
    effects: Sender<Stamped>,
    sequence: Arc<AtomicU64>,
}

impl EventSender {
    /// Sends an event without blocking.
    ///
    /// Returns `false` if the event was dropped: an effect found its channel
    /// full, or every receiver is gone.
    #[inline]
    pub fn send(&self, event: GameEvent) -> bool {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        if !event.is_effect() {
            return self.state.send((seq, event)).is_ok();
        }
        match self.effects.try_send((seq, event)) {
            Ok(()) => true,
            Err(TrySendError::Full((_, event))) => {
                tracing::warn!("Effect channel full, dropped {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

impl ItemSpawner for EventSender {
    fn spawn_item(&mut self, at: BlockPos, stack: ItemStack) -> bool {
        self.send(GameEvent::ItemSpawned { pos: at, stack })
    }
}

impl EffectSink for EventSender {
    fn particles(&mut self, kind: ParticleKind, at: Vec3, count: u32) {
        self.send(GameEvent::Effect(EffectEvent::Particles { kind, at, count }));
    }

    fn sound(&mut self, kind: SoundKind, at: Vec3) {
        self.send(GameEvent::Effect(EffectEvent::Sound { kind, at }));
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    state: Receiver<Stamped>,
    effects: Receiver<Stamped>,
}

impl EventReceiver {
    /// Takes every pending event, in the order they were sent.
    #[inline]
    pub fn drain(&self) -> Vec<GameEvent> {
        let mut stamped: Vec<Stamped> = Vec::with_capacity(64);
        stamped.extend(self.state.try_iter());
        stamped.extend(self.effects.try_iter());
        stamped.sort_unstable_by_key(|(seq, _)| *seq);
        stamped.into_iter().map(|(_, event)| event).collect()
    }

    /// Number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.len() + self.effects.len()
    }

    /// Number of pending effects.
    #[inline]
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.effects.len()
    }

    /// Whether any event is pending.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.state.is_empty() || !self.effects.is_empty()
    }
}
