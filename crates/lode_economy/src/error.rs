//! # Economy Error Types
//!
//! All errors that can occur in the economy system.

use thiserror::Error;

/// Errors that can occur in the economy system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EconomyError {
    /// Inventory is full, cannot add more items.
    #[error("inventory full: capacity {capacity}, tried to add {amount}")]
    InventoryFull {
        /// Current capacity.
        capacity: u32,
        /// Amount tried to add.
        amount: u32,
    },

    /// The entity is not holding a tool.
    #[error("entity {0} holds no tool")]
    NoTool(u64),

    /// The entity holds a different tool than the one named.
    #[error("entity {entity_id} does not hold tool {tool_id}")]
    ToolNotHeld {
        /// The entity.
        entity_id: u64,
        /// The tool that was expected in its hand.
        tool_id: u64,
    },

    /// Arithmetic overflow in fixed-point calculation.
    #[error("arithmetic overflow in economic calculation")]
    ArithmeticOverflow,

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;
