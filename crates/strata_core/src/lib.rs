//! # STRATA Core
//!
//! The tile world a generation pipeline writes into:
//! - `Tile` cells as 16-byte plain-old-data records
//! - An arena grid addressed by computed offset
//! - A protection overlay gating which parts of a write are honored
//! - Chest records filled once at placement
//!
//! ## Architecture Rules
//!
//! 1. **Writes go through the overlay** - stages compose by protecting cells
//! 2. **No references into the grid across writes** - cells are copied out
//! 3. **Fixed dimensions** - a world never resizes during a run
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_core::{ProtectionFlags, Tile, TilePos, TileRect, World};
//!
//! let mut world = World::new(100, 50);
//! world.set_protection(TileRect::from_size(10, 10, 8, 6), ProtectionFlags::SOLID)?;
//! world.place_tile(TilePos::new(12, 12), Tile::EMPTY)?; // rejected, still solid
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalog;
pub mod chest;
pub mod error;
pub mod grid;
pub mod protection;
pub mod sync;
pub mod tile;
pub mod world;

pub use catalog::{TileCatalog, TileTraits};
pub use chest::{Chest, ChestHandle, ChestStore, ItemStack, CHEST_CAPACITY, MAX_CHESTS};
pub use error::{CoreError, CoreResult};
pub use grid::{TileGrid, TilePos, TileRect};
pub use protection::{compose_tile, MaskBlock, ProtectionFlags, ProtectionOverlay};
pub use sync::{SharedWorld, WorldGuard};
pub use tile::{ids, walls, LiquidKind, Slope, Tile, Wiring};
pub use world::World;
