//! # Generation Error Types
//!
//! Everything a stage, the bus or a pipeline file can fail with.
//!
//! Geometric infeasibility is not in here: a stage that cannot fit its
//! shape returns `Ok(false)` and the run is reported as failed.

use strata_core::CoreError;
use strata_loot::LootError;
use strata_procedural::PlacementError;
use thiserror::Error;

/// Bus lookup failures. Never defaulted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// No value was published under the name.
    #[error("no bus value named {0}")]
    MissingKey(String),

    /// A value exists but holds a different variant.
    #[error("bus value {key} is {found}, not {expected}")]
    TypeMismatch {
        /// The name looked up.
        key: String,
        /// Variant the getter wanted.
        expected: &'static str,
        /// Variant actually stored.
        found: &'static str,
    },
}

/// Result type for bus lookups.
pub type ContextResult<T> = Result<T, ContextError>;

/// Pipeline file failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {message}")]
    Io {
        /// File that was being read.
        path: String,
        /// OS error text.
        message: String,
    },

    /// Malformed TOML or an unknown stage kind.
    #[error("invalid pipeline file: {0}")]
    Parse(String),

    /// World dimensions that cannot hold a grid.
    #[error("invalid world size {width}x{height}")]
    WorldSize {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// A chest stage with no loot tables to draw from.
    #[error("stage {index} places chests but the file has no loot tables")]
    MissingLoot {
        /// Position of the stage in the file.
        index: usize,
    },

    /// The loot tables failed validation.
    #[error(transparent)]
    Loot(#[from] LootError),
}

/// Result type for pipeline files.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors a stage can raise. Any of these aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenError {
    /// Grid, overlay or chest store failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid placement or brush settings.
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// Loot lookup or resolution failure.
    #[error(transparent)]
    Loot(#[from] LootError),

    /// Missing or mistyped bus value.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Pipeline file failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A stage setting outside its domain.
    #[error("invalid setting in stage {stage}: {reason}")]
    InvalidSetting {
        /// Stage name.
        stage: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The background run could not be started or died.
    #[error("pipeline worker failed: {0}")]
    Worker(String),
}

/// Result type for stages and runs.
pub type GenResult<T> = Result<T, GenError>;
