//! # LODE
//!
//! The mining server: world, economy and vein miner wired together.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          MiningServer                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────────┐   │
//! │  │  BlockWorld  │<───│  VeinMiner   │───>│  TheBank         │   │
//! │  │  (blocks)    │    │  (sessions)  │    │  LootTables      │   │
//! │  └──────────────┘    └──────┬───────┘    └──────────────────┘   │
//! │                             │                                   │
//! │                             v                                   │
//! │                      ┌──────────────┐                           │
//! │                      │   EventBus   │──> clients                │
//! │                      └──────────────┘                           │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `events`: Outbound event channel
//! - `world`: Block storage
//! - `tick`: Fixed-rate tick loop
//! - `server`: Block break handling and per-tick driving

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod events;
pub mod server;
pub mod tick;
pub mod world;

// Re-export the layers
pub use lode_economy as economy;
pub use lode_mining as mining;
pub use lode_shared as shared;

pub use events::{EventBus, EventReceiver, EventSender, GameEvent};
pub use server::MiningServer;
pub use tick::{TickLoop, TickStats};
pub use world::BlockWorld;
