//! # LODE Vein Mining
//!
//! When a player breaks an ore block, every connected block of the same ore
//! class goes with it: for a stamina price, either at once or as a cascade
//! spread over server ticks, with all the loot landing on the origin block.
//!
//! ## The Pipeline
//!
//! ```text
//! origin broken ──> OreClassifier ──> VeinSearch ──> CostGate ──> BreakScheduler
//!                   (eligible? build    (bounded       (debit      (instant or
//!                    the matcher)        26-BFS)        stamina)    cascaded jobs)
//!                                                                        │
//!                                          per job: drops ──> DropConsolidator
//!                                                                        │
//!                                          last job: one spawn at the origin
//! ```
//!
//! ## Glass Walls
//!
//! The world, loot rolls, stamina, tool wear, item spawning and effects are
//! all reached through the traits in [`hooks`]. The economy types implement
//! theirs here; the server implements the world and event sides.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut miner = VeinMiner::new(VeinConfig::load("config/veinmine.toml")?, registry)?;
//!
//! // Block break event from the game layer
//! let outcome = miner.on_origin_block_broken(pos, block, player, tool, tick, &mut hooks);
//!
//! // Every server tick
//! for report in miner.tick(tick, &mut hooks) {
//!     tracing::info!("vein done: {} blocks", report.broken);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod classifier;
pub mod config;
pub mod cost;
pub mod drops;
pub mod error;
pub mod hooks;
pub mod miner;
pub mod scheduler;
pub mod search;
pub mod session;

#[cfg(test)]
mod testkit;

pub use classifier::{OreClass, OreClassifier, VeinMatcher};
pub use config::{ExecutionMode, SearchBudget, ToolBreakPolicy, VeinConfig};
pub use cost::{CostGate, Reservation};
pub use drops::{DrainSummary, DropConsolidator};
pub use error::{MiningError, MiningResult};
pub use hooks::{
    ActorId, BlockAccess, BlockEntityId, DropResolver, EffectSink, ItemSpawner, MiningHooks,
    StaminaLedger, ToolWear, WeightProvider,
};
pub use miner::{Activation, VeinMiner};
pub use scheduler::BreakScheduler;
pub use search::VeinSearch;
pub use session::{BreakJob, BreakSession, SessionId, SessionState, StepOutcome, VeinReport};
