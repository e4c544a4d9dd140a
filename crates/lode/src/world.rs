//! Sparse block storage for the mining server.
//!
//! Positions never written read as air. Removals performed through
//! [`BlockAccess`] are announced on the event channel when one is attached.

use std::collections::HashMap;

use lode_mining::{BlockAccess, BlockEntityId};
use lode_shared::{BlockId, BlockPos};

use crate::events::{EventSender, GameEvent};

/// The block world.
#[derive(Default)]
pub struct BlockWorld {
    blocks: HashMap<BlockPos, BlockId>,
    entities: HashMap<BlockPos, BlockEntityId>,
    events: Option<EventSender>,
}

impl BlockWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Announces removals on `events`.
    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Sets a block. Setting air clears the position and its block entity.
    pub fn set_block(&mut self, pos: BlockPos, block: BlockId) {
        if block.is_air() {
            self.blocks.remove(&pos);
            self.entities.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
    }

    /// Attaches a block entity to a position.
    pub fn attach_entity(&mut self, pos: BlockPos, entity: BlockEntityId) {
        self.entities.insert(pos, entity);
    }

    /// Number of non-air blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of blocks of one type.
    #[must_use]
    pub fn count_of(&self, block: BlockId) -> usize {
        self.blocks.values().filter(|&&b| b == block).count()
    }
}

impl BlockAccess for BlockWorld {
    fn block_at(&self, pos: BlockPos) -> BlockId {
        self.blocks.get(&pos).copied().unwrap_or(BlockId::AIR)
    }

    fn remove_block(&mut self, pos: BlockPos) {
        self.set_block(pos, BlockId::AIR);
        if let Some(events) = &self.events {
            events.send(GameEvent::BlockRemoved { pos });
        }
    }

    fn block_entity(&self, pos: BlockPos) -> Option<BlockEntityId> {
        self.entities.get(&pos).copied()
    }
}
