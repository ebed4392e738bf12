//! # World
//!
//! The unit a pipeline run owns exclusively: grid, protection overlay,
//! chests and the catalog the overlay consults.

use crate::catalog::TileCatalog;
use crate::chest::{Chest, ChestHandle, ChestStore};
use crate::error::{CoreError, CoreResult};
use crate::grid::{TileGrid, TilePos, TileRect};
use crate::protection::{MaskBlock, ProtectionFlags, ProtectionOverlay};
use crate::tile::Tile;

/// A tile world under generation.
#[derive(Clone, Debug)]
pub struct World {
    grid: TileGrid,
    overlay: ProtectionOverlay,
    chests: ChestStore,
    catalog: TileCatalog,
}

impl World {
    /// Creates a blank world with the standard catalog.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_catalog(width, height, TileCatalog::standard())
    }

    /// Creates a blank world with a host-supplied catalog.
    #[must_use]
    pub fn with_catalog(width: usize, height: usize, catalog: TileCatalog) -> Self {
        Self {
            grid: TileGrid::new(width, height),
            overlay: ProtectionOverlay::new(width, height),
            chests: ChestStore::new(),
            catalog,
        }
    }

    /// Width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.grid.width()
    }

    /// Height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.grid.height()
    }

    /// Blanks the grid, clears protection and removes every chest.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.overlay.clear();
        self.chests.clear();
    }

    /// The tile grid.
    #[inline]
    #[must_use]
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Mutable grid access. Writes through this bypass protection.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    /// The protection overlay.
    #[inline]
    #[must_use]
    pub const fn overlay(&self) -> &ProtectionOverlay {
        &self.overlay
    }

    /// The tile catalog.
    #[inline]
    #[must_use]
    pub const fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    /// The chests placed so far.
    #[inline]
    #[must_use]
    pub const fn chests(&self) -> &ChestStore {
        &self.chests
    }

    /// Tile at a position.
    #[inline]
    #[must_use]
    pub fn tile(&self, pos: TilePos) -> Option<Tile> {
        self.grid.get(pos)
    }

    /// Returns true if the position holds an active solid tile.
    #[must_use]
    pub fn is_solid_at(&self, pos: TilePos) -> bool {
        self.grid
            .get(pos)
            .is_some_and(|t| t.is_active() && self.catalog.is_solid(t.tile_type))
    }

    /// Writes one tile through the overlay.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` for positions outside the grid.
    pub fn place_tile(&mut self, pos: TilePos, incoming: Tile) -> CoreResult<Tile> {
        self.overlay
            .place_tile(&mut self.grid, &self.catalog, pos, incoming)
    }

    /// Rewrites only activity and type of a cell, through the overlay.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` for positions outside the grid.
    pub fn set_block(&mut self, pos: TilePos, active: bool, tile_type: u16) -> CoreResult<Tile> {
        let mut incoming = self.grid.get(pos).unwrap_or_default();
        incoming.set_type(active, tile_type);
        self.place_tile(pos, incoming)
    }

    /// Writes `tile` to every cell of a rectangle (clipped to the grid) through the overlay.
    ///
    /// # Errors
    ///
    /// Returns `InvertedRect` if min > max on either axis.
    pub fn fill_rect(&mut self, rect: TileRect, tile: Tile) -> CoreResult<()> {
        if rect.is_inverted() {
            return Err(CoreError::InvertedRect {
                min_x: rect.min_x,
                min_y: rect.min_y,
                max_x: rect.max_x,
                max_y: rect.max_y,
            });
        }
        let Some(clipped) = rect.clipped(self.width(), self.height()) else {
            return Ok(());
        };
        for pos in clipped.positions() {
            self.place_tile(pos, tile)?;
        }
        Ok(())
    }

    /// Stamps a block of tiles and ORs its masks into the overlay.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the blocks differ in size.
    pub fn place_tiles(
        &mut self,
        tiles: &TileGrid,
        masks: &MaskBlock,
        origin: TilePos,
    ) -> CoreResult<()> {
        self.overlay
            .place_tiles(&mut self.grid, &self.catalog, tiles, masks, origin)
    }

    /// Assigns protection over a rectangle.
    ///
    /// # Errors
    ///
    /// Returns `InvertedRect` if min > max on either axis.
    pub fn set_protection(&mut self, rect: TileRect, mask: ProtectionFlags) -> CoreResult<()> {
        self.overlay.set_protection(rect, mask)
    }

    /// ORs protection into one cell.
    pub fn protect(&mut self, pos: TilePos, mask: ProtectionFlags) {
        self.overlay.protect(pos, mask);
    }

    /// Protection at a position.
    #[must_use]
    pub fn protection(&self, pos: TilePos) -> ProtectionFlags {
        self.overlay.get(pos)
    }

    /// Removes all protection.
    pub fn clear_protection(&mut self) {
        self.overlay.clear();
    }

    /// Adds a chest.
    ///
    /// # Errors
    ///
    /// Returns `ChestLimit` once the store is full.
    pub fn add_chest(&mut self, chest: Chest) -> CoreResult<ChestHandle> {
        self.chests.add(chest)
    }

    /// Chest lookup for filling.
    ///
    /// # Errors
    ///
    /// Returns `UnknownChest` for a foreign handle.
    pub fn chest_mut(&mut self, handle: ChestHandle) -> CoreResult<&mut Chest> {
        self.chests.get_mut(handle)
    }

    /// Fraction of cells holding an active solid tile.
    #[must_use]
    pub fn solid_ratio(&self) -> f64 {
        let total = self.grid.cells().len();
        if total == 0 {
            return 0.0;
        }
        let solid = self
            .grid
            .count(|t| t.is_active() && self.catalog.is_solid(t.tile_type));
        solid as f64 / total as f64
    }
}
