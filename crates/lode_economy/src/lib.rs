//! # LODE Economy System
//!
//! Pure Rust economic logic for the LODE game server.
//!
//! ## Design Principles
//!
//! 1. **Zero floating point** - Stamina and costs use fixed-point (u64 with implicit decimals)
//! 2. **Atomic debits** - A stamina debit either fully happens or not at all
//! 3. **Deterministic loot** - Same secret, same inputs, same drops
//! 4. **External configuration** - All balance data in TOML files
//!
//! ## Thread Safety
//!
//! [`TheBank`] is `Send + Sync`. Every per-entity mutation happens inside a
//! single short critical section.
//!
//! ## Example
//!
//! ```rust,ignore
//! use lode_economy::{TheBank, FixedPoint};
//!
//! let bank = TheBank::new(FixedPoint::from_whole(100));
//! bank.set_stamina(player, FixedPoint::from_whole(20));
//! assert!(bank.try_debit_stamina(player, FixedPoint::from_whole(5)));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bank;
pub mod error;
pub mod fixed_point;
pub mod inventory;
pub mod loot;
pub mod stamina;
pub mod tool;

pub use bank::{EntityId, TheBank};
pub use error::{EconomyError, EconomyResult};
pub use fixed_point::FixedPoint;
pub use inventory::{Inventory, ItemId, ItemStack, ItemWeights};
pub use loot::{LootEntry, LootSeed, LootTable, LootTables};
pub use stamina::StaminaPool;
pub use tool::{Enchantments, Tool, ToolCondition, ToolId};
