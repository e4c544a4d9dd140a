//! # Vein Mining Configuration
//!
//! Loaded once at startup from `config/veinmine.toml`. Every field has a
//! default, so an empty file is a valid configuration.
//!
//! ```toml
//! max_blocks = 512
//! max_range = 16
//! per_block_cost = "0.5"
//! weight_scaling = "0.5"
//! mode = "cascade"
//! step_delay_ticks = 1
//! on_tool_break = "abort"
//! ```

use std::path::Path;

use lode_economy::FixedPoint;
use lode_shared::{BlockId, BlockRegistry};
use serde::Deserialize;

use crate::error::{MiningError, MiningResult};

/// How a granted vein is broken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Every block breaks during the activation call.
    Instant,
    /// One block per `step_delay_ticks`, in discovery order.
    #[default]
    Cascade,
}

/// What happens when the tool breaks mid-vein.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolBreakPolicy {
    /// Stop the session. Loot collected so far is still spawned.
    #[default]
    Abort,
    /// Keep going with the bare hand.
    BareHand,
}

/// Search limits for one activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchBudget {
    /// Vein size including the origin block.
    pub max_blocks: u32,
    /// Chebyshev distance limit from the origin.
    pub max_range: u32,
}

impl SearchBudget {
    /// Positions the search may return: the origin is already broken.
    #[must_use]
    pub const fn max_results(&self) -> usize {
        self.max_blocks.saturating_sub(1) as usize
    }
}

/// Vein mining tunables.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VeinConfig {
    /// Vein size cap including the origin.
    pub max_blocks: u32,
    /// Chebyshev range limit from the origin.
    pub max_range: u32,
    /// Stamina per block, before the weight penalty.
    pub per_block_cost: FixedPoint,
    /// How strongly carried weight raises the cost.
    pub weight_scaling: FixedPoint,
    /// Instant or cascaded breaking.
    pub mode: ExecutionMode,
    /// Ticks between cascade steps.
    pub step_delay_ticks: u32,
    /// Trail particles per broken block.
    pub trail_particles: u32,
    /// Tool break handling.
    pub on_tool_break: ToolBreakPolicy,
    /// Block names that can start a vein.
    pub eligible: Vec<String>,
    /// Name prefixes marking a deeper variant of another block.
    pub depth_variant_prefixes: Vec<String>,
}

/// Ores that vein out of the box, with their deepslate variants.
const DEFAULT_ORES: [&str; 8] = [
    "coal_ore",
    "iron_ore",
    "copper_ore",
    "gold_ore",
    "redstone_ore",
    "lapis_ore",
    "diamond_ore",
    "emerald_ore",
];

impl Default for VeinConfig {
    fn default() -> Self {
        let mut eligible: Vec<String> = DEFAULT_ORES.iter().map(|&ore| ore.to_owned()).collect();
        eligible.extend(DEFAULT_ORES.iter().map(|ore| format!("deepslate_{ore}")));
        eligible.extend(
            ["nether_quartz_ore", "nether_gold_ore", "ancient_debris"].map(String::from),
        );

        Self {
            max_blocks: 512,
            max_range: 16,
            per_block_cost: FixedPoint::from_parts(0, 500_000),
            weight_scaling: FixedPoint::from_parts(0, 500_000),
            mode: ExecutionMode::Cascade,
            step_delay_ticks: 1,
            trail_particles: 8,
            on_tool_break: ToolBreakPolicy::Abort,
            eligible,
            depth_variant_prefixes: vec!["deepslate_".to_owned()],
        }
    }
}

impl VeinConfig {
    /// Parses and validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns `MiningError::Toml` for malformed input and
    /// `MiningError::InvalidConfig` for out-of-range values.
    pub fn from_toml_str(src: &str) -> MiningResult<Self> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `MiningError::Io` if the file cannot be read, otherwise as
    /// [`VeinConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> MiningResult<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| MiningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&src)?;
        tracing::info!(
            "Loaded vein config from {}: {} eligible blocks, {:?} mode",
            path.display(),
            config.eligible.len(),
            config.mode
        );
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns `MiningError::InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> MiningResult<()> {
        if self.max_blocks == 0 {
            return Err(MiningError::InvalidConfig(
                "max_blocks must be at least 1".into(),
            ));
        }
        if self.max_range == 0 {
            return Err(MiningError::InvalidConfig(
                "max_range must be at least 1".into(),
            ));
        }
        if self.mode == ExecutionMode::Cascade && self.step_delay_ticks == 0 {
            return Err(MiningError::InvalidConfig(
                "step_delay_ticks must be at least 1 in cascade mode".into(),
            ));
        }
        if self.depth_variant_prefixes.iter().any(String::is_empty) {
            return Err(MiningError::InvalidConfig(
                "depth_variant_prefixes must not contain an empty prefix".into(),
            ));
        }
        Ok(())
    }

    /// Search limits.
    #[must_use]
    pub const fn budget(&self) -> SearchBudget {
        SearchBudget {
            max_blocks: self.max_blocks,
            max_range: self.max_range,
        }
    }

    /// Resolves the eligible names against the registry.
    ///
    /// # Errors
    ///
    /// Returns `MiningError::UnknownBlock` for a name the registry lacks.
    pub fn eligible_ids(&self, registry: &BlockRegistry) -> MiningResult<Vec<BlockId>> {
        self.eligible
            .iter()
            .map(|name| {
                registry
                    .id(name)
                    .ok_or_else(|| MiningError::UnknownBlock(name.clone()))
            })
            .collect()
    }
}
