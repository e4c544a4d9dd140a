//! # The Bank
//!
//! **Nothing is spent without our approval.**
//!
//! `TheBank` owns the economic state of every entity: stamina, inventory and
//! the held tool. Other systems call in here instead of touching that state
//! directly.
//!
//! ## Atomicity
//!
//! Each stamina pool lives behind one `parking_lot::Mutex`. A debit checks
//! the balance and subtracts inside the same critical section, so two
//! concurrent debits against one entity can never both pass on a balance
//! that only covers one of them.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};

use crate::error::{EconomyError, EconomyResult};
use crate::fixed_point::FixedPoint;
use crate::inventory::{Inventory, ItemStack, ItemWeights, DEFAULT_MAX_STACK};
use crate::stamina::StaminaPool;
use crate::tool::{Tool, ToolCondition, ToolId};

/// Entity identifier.
pub type EntityId = u64;

/// The Bank - the economy's single point of contact.
///
/// `TheBank` is `Send + Sync` and can be shared across threads.
pub struct TheBank {
    /// Stamina by entity.
    stamina: Mutex<HashMap<EntityId, StaminaPool>>,
    /// Inventories by entity.
    inventories: RwLock<HashMap<EntityId, Inventory>>,
    /// Held tool by entity.
    tools: Mutex<HashMap<EntityId, Tool>>,
    /// Item weights for carry penalties.
    weights: ItemWeights,
    /// Carried weight at which the penalty reaches 1.0.
    carry_capacity: FixedPoint,
}

impl TheBank {
    /// Creates a bank with uniform item weight 1.0.
    #[must_use]
    pub fn new(carry_capacity: FixedPoint) -> Self {
        Self::with_weights(ItemWeights::uniform(FixedPoint::ONE), carry_capacity)
    }

    /// Creates a bank with explicit item weights.
    #[must_use]
    pub fn with_weights(weights: ItemWeights, carry_capacity: FixedPoint) -> Self {
        Self {
            stamina: Mutex::new(HashMap::new()),
            inventories: RwLock::new(HashMap::new()),
            tools: Mutex::new(HashMap::new()),
            weights,
            carry_capacity,
        }
    }

    // ========================================================================
    // Stamina
    // ========================================================================

    /// Sets an entity's stamina pool, registering the entity if needed.
    pub fn set_stamina(&self, entity_id: EntityId, pool: StaminaPool) {
        self.stamina.lock().insert(entity_id, pool);
    }

    /// Current stamina of an entity.
    #[must_use]
    pub fn stamina(&self, entity_id: EntityId) -> Option<FixedPoint> {
        self.stamina.lock().get(&entity_id).map(StaminaPool::current)
    }

    /// Atomically debits `amount` if the entity holds at least that much.
    ///
    /// Returns false, with the balance untouched, if the entity is unknown
    /// or cannot pay.
    #[must_use]
    pub fn try_debit_stamina(&self, entity_id: EntityId, amount: FixedPoint) -> bool {
        let mut stamina = self.stamina.lock();
        let Some(pool) = stamina.get_mut(&entity_id) else {
            return false;
        };
        let paid = pool.try_spend(amount);
        if !paid {
            tracing::debug!(
                "Entity {} cannot pay {} stamina (has {})",
                entity_id,
                amount,
                pool.current()
            );
        }
        paid
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    /// Adds items to an entity's inventory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InventoryFull` if the items do not fit.
    pub fn give(&self, entity_id: EntityId, stack: ItemStack) -> EconomyResult<()> {
        let mut inventories = self.inventories.write();
        inventories
            .entry(entity_id)
            .or_default()
            .add(stack.item_id, stack.count, DEFAULT_MAX_STACK)
    }

    /// Runs `f` against an entity's inventory.
    pub fn with_inventory<R>(
        &self,
        entity_id: EntityId,
        f: impl FnOnce(&Inventory) -> R,
    ) -> Option<R> {
        self.inventories.read().get(&entity_id).map(f)
    }

    /// Carry-weight penalty: carried weight divided by carry capacity.
    ///
    /// Zero for entities without an inventory. Not clamped; an overloaded
    /// entity pays more than double.
    #[must_use]
    pub fn weight_penalty(&self, entity_id: EntityId) -> FixedPoint {
        let carried = self
            .with_inventory(entity_id, |inv| inv.carried_weight(&self.weights))
            .unwrap_or(FixedPoint::ZERO);
        carried
            .checked_div(self.carry_capacity)
            .unwrap_or(FixedPoint::ZERO)
    }

    // ========================================================================
    // Tools
    // ========================================================================

    /// Puts a tool in an entity's hand.
    pub fn equip(&self, entity_id: EntityId, tool: Tool) {
        self.tools.lock().insert(entity_id, tool);
    }

    /// The tool an entity is holding, or the bare hand.
    #[must_use]
    pub fn held_tool(&self, entity_id: EntityId) -> Tool {
        self.tools
            .lock()
            .get(&entity_id)
            .copied()
            .unwrap_or_else(Tool::bare_hand)
    }

    /// Whether the entity currently holds the tool instance `tool_id`.
    #[must_use]
    pub fn holds_tool(&self, entity_id: EntityId, tool_id: ToolId) -> bool {
        self.tools
            .lock()
            .get(&entity_id)
            .is_some_and(|tool| tool.id == tool_id)
    }

    /// Wears tool `tool_id` in the entity's hand. A broken tool leaves the
    /// hand empty.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::NoTool` if the entity holds nothing and
    /// `EconomyError::ToolNotHeld` if it holds another tool. Nothing is worn
    /// in either case.
    pub fn wear_tool(
        &self,
        entity_id: EntityId,
        tool_id: ToolId,
        amount: u32,
    ) -> EconomyResult<ToolCondition> {
        let mut tools = self.tools.lock();
        let tool = tools
            .get_mut(&entity_id)
            .ok_or(EconomyError::NoTool(entity_id))?;
        if tool.id != tool_id {
            return Err(EconomyError::ToolNotHeld {
                entity_id,
                tool_id,
            });
        }
        let condition = tool.apply_wear(amount);
        if condition.is_broken() {
            tracing::debug!("Tool {} of entity {} broke", tool.id, entity_id);
            tools.remove(&entity_id);
        }
        Ok(condition)
    }
}
