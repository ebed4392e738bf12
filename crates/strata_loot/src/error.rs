//! # Loot Error Types
//!
//! All errors that can occur while loading or resolving loot.

use thiserror::Error;

/// Errors that can occur in the loot system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LootError {
    /// Chest template not found in the registry.
    #[error("chest template not found: {0}")]
    UnknownChest(String),

    /// Item slot not found in the registry.
    #[error("item slot not found: {0}")]
    UnknownSlot(String),

    /// Item not found in the registry.
    #[error("item not found: {0}")]
    UnknownItem(String),

    /// Slots reference each other in a loop.
    #[error("cycle detected in loot slots: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),

    /// Slot nesting went deeper than the resolver allows.
    #[error("slot nesting deeper than {depth} at slot {slot}")]
    DepthExceeded {
        /// Slot being entered when the limit was hit.
        slot: String,
        /// The depth limit.
        depth: usize,
    },

    /// A min/max pair where min > max.
    #[error("invalid {what} range in {owner}: {min} > {max}")]
    InvalidRange {
        /// Item, slot or chest name.
        owner: String,
        /// Which range.
        what: &'static str,
        /// Lower bound.
        min: u32,
        /// Upper bound.
        max: u32,
    },

    /// A probability or weight that is negative or not finite.
    #[error("invalid {what} in {owner}: {value}")]
    InvalidWeight {
        /// Item, slot or chest name.
        owner: String,
        /// Which value.
        what: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Malformed configuration file.
    #[error("invalid loot configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for loot operations.
pub type LootResult<T> = Result<T, LootError>;
