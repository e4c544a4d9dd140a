//! # Mining Error Types
//!
//! Only construction and configuration can fail. Running an activation
//! never returns an error: declined, skipped and truncated work is reported
//! through [`crate::Activation`] and [`crate::VeinReport`].

use std::path::PathBuf;

use lode_economy::EconomyError;
use thiserror::Error;

/// Errors raised while building the vein miner.
#[derive(Error, Debug)]
pub enum MiningError {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration names a block the registry does not know.
    #[error("unknown block in configuration: {0:?}")]
    UnknownBlock(String),

    /// The configuration file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::VeinConfig`].
    #[error("malformed configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// An economy table failed to load.
    #[error(transparent)]
    Economy(#[from] EconomyError),
}

/// Result type for mining setup.
pub type MiningResult<T> = Result<T, MiningError>;
