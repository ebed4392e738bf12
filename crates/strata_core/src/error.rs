//! # Core Error Types
//!
//! All errors that can occur while touching the grid, the overlay or chests.

use thiserror::Error;

/// Errors that can occur in the core tile world.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A position outside the grid was addressed.
    #[error("position ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Requested X.
        x: i32,
        /// Requested Y.
        y: i32,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// A rectangle with min > max on some axis.
    #[error("inverted rectangle: ({min_x}, {min_y})..=({max_x}, {max_y})")]
    InvertedRect {
        /// Minimum X.
        min_x: i32,
        /// Minimum Y.
        min_y: i32,
        /// Maximum X.
        max_x: i32,
        /// Maximum Y.
        max_y: i32,
    },

    /// A tile block and its mask block have different dimensions.
    #[error("tile block is {tiles_width}x{tiles_height} but mask block is {mask_width}x{mask_height}")]
    DimensionMismatch {
        /// Tile block width.
        tiles_width: usize,
        /// Tile block height.
        tiles_height: usize,
        /// Mask block width.
        mask_width: usize,
        /// Mask block height.
        mask_height: usize,
    },

    /// The chest store is full.
    #[error("chest limit reached: {0} chests")]
    ChestLimit(usize),

    /// A chest handle that does not belong to the store.
    #[error("unknown chest handle: {0}")]
    UnknownChest(usize),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
