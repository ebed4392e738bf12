//! # Tile Protection Overlay
//!
//! A bitmask per cell, parallel to the grid, deciding which parts of an
//! incoming tile write are honored. This is what lets stages compose: a room
//! stage protects its walls, and a later cave brush can carve right up to
//! them without eating through.
//!
//! ## Gates
//!
//! ```text
//! mask == NONE  → incoming tile replaces the cell outright
//!
//! otherwise, each group is gated independently:
//!   tile identity (active/type/frame/shape/paint)
//!       TOP_SOLID          incoming must be active and support top
//!       BOTTOM/LEFT/RIGHT  incoming must be active and solid
//!       TILE_TYPE          incoming must be active with the same type
//!       TILE_SHAPE         half-brick and slope must match
//!       TILE_FRAME         frame coordinates must match
//!   wall      (id + paint)   rejected by WALL
//!   liquid    (amount + kind) rejected by LIQUID
//!   wires                    rejected by WIRE
//!   actuator                 rejected by ACTUATOR
//! ```
//!
//! Protection only accumulates during a run; the runner clears it before
//! the first stage.

use crate::catalog::TileCatalog;
use crate::error::{CoreError, CoreResult};
use crate::grid::{TileGrid, TilePos, TileRect};
use crate::tile::{Tile, Wiring};

/// Per-cell protection bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProtectionFlags(u16);

impl ProtectionFlags {
    /// Unprotected, always overwritable.
    pub const NONE: Self = Self(0);
    /// Only tiles that support top placement may replace the tile.
    pub const TOP_SOLID: Self = Self(1 << 0);
    /// Only solid tiles may replace the tile.
    pub const BOTTOM_SOLID: Self = Self(1 << 1);
    /// Only solid tiles may replace the tile.
    pub const LEFT_SOLID: Self = Self(1 << 2);
    /// Only solid tiles may replace the tile.
    pub const RIGHT_SOLID: Self = Self(1 << 3);
    /// All four solid sides.
    pub const SOLID: Self = Self(0b1111);
    /// Wall is fixed.
    pub const WALL: Self = Self(1 << 4);
    /// Liquid is fixed.
    pub const LIQUID: Self = Self(1 << 5);
    /// Wires are fixed.
    pub const WIRE: Self = Self(1 << 6);
    /// Actuator is fixed.
    pub const ACTUATOR: Self = Self(1 << 7);
    /// Half-brick and slope are fixed.
    pub const TILE_SHAPE: Self = Self(1 << 8);
    /// Tile type is fixed.
    pub const TILE_TYPE: Self = Self(1 << 9);
    /// Frame coordinates are fixed.
    pub const TILE_FRAME: Self = Self(1 << 10);
    /// Type and frame: the same placed item must stay.
    pub const SAME_TILE_ITEM: Self = Self(Self::TILE_TYPE.0 | Self::TILE_FRAME.0);
    /// Everything.
    pub const ALL: Self = Self(0b111_1111_1111);

    const SIDES: Self = Self(Self::BOTTOM_SOLID.0 | Self::LEFT_SOLID.0 | Self::RIGHT_SOLID.0);

    /// Creates flags from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw & Self::ALL.0)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Returns true if no flag is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every flag of `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns true if any flag of `other` is set.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Combines two flag sets.
    #[inline]
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for ProtectionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl std::ops::BitOrAssign for ProtectionFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Decides whether the tile-identity fields of `incoming` may overwrite `existing`.
fn identity_accepted(
    existing: &Tile,
    incoming: &Tile,
    mask: ProtectionFlags,
    catalog: &TileCatalog,
) -> bool {
    let active = incoming.is_active();

    if mask.intersects(ProtectionFlags::TOP_SOLID)
        && !(active && catalog.supports_top(incoming.tile_type))
    {
        return false;
    }
    if mask.intersects(ProtectionFlags::SIDES) && !(active && catalog.is_solid(incoming.tile_type)) {
        return false;
    }
    if mask.intersects(ProtectionFlags::TILE_TYPE)
        && !(active && incoming.tile_type == existing.tile_type)
    {
        return false;
    }
    if mask.intersects(ProtectionFlags::TILE_SHAPE) && !existing.same_shape(incoming) {
        return false;
    }
    if mask.intersects(ProtectionFlags::TILE_FRAME) && !existing.same_frame(incoming) {
        return false;
    }
    true
}

/// Writes `incoming` into `existing` under `mask`.
pub fn compose_tile(
    existing: &mut Tile,
    incoming: Tile,
    mask: ProtectionFlags,
    catalog: &TileCatalog,
) {
    if mask.is_empty() {
        *existing = incoming;
        return;
    }

    if identity_accepted(existing, &incoming, mask, catalog) {
        existing.active = incoming.active;
        existing.tile_type = incoming.tile_type;
        existing.frame_x = incoming.frame_x;
        existing.frame_y = incoming.frame_y;
        existing.half_brick = incoming.half_brick;
        existing.slope = incoming.slope;
        existing.tile_color = incoming.tile_color;
    }

    if !mask.intersects(ProtectionFlags::WALL) {
        existing.wall = incoming.wall;
        existing.wall_color = incoming.wall_color;
    }

    if !mask.intersects(ProtectionFlags::LIQUID) {
        existing.liquid = incoming.liquid;
        existing.liquid_kind = incoming.liquid_kind;
    }

    if !mask.intersects(ProtectionFlags::WIRE) {
        let wires = Wiring::WIRES.raw();
        existing.wiring = (existing.wiring & !wires) | (incoming.wiring & wires);
    }

    if !mask.intersects(ProtectionFlags::ACTUATOR) {
        let actuator = Wiring::ACTUATOR.raw();
        existing.wiring = (existing.wiring & !actuator) | (incoming.wiring & actuator);
    }
}

/// A rectangular block of masks, stamped alongside a block of tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskBlock {
    width: usize,
    height: usize,
    masks: Vec<ProtectionFlags>,
}

impl MaskBlock {
    /// Creates a block with every mask set to `mask`.
    #[must_use]
    pub fn filled(width: usize, height: usize, mask: ProtectionFlags) -> Self {
        Self {
            width,
            height,
            masks: vec![mask; width * height],
        }
    }

    /// Creates an unprotected block.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, ProtectionFlags::NONE)
    }

    /// Block width.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Block height.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Mask at block-local coordinates.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> ProtectionFlags {
        if x < self.width && y < self.height {
            self.masks[y * self.width + x]
        } else {
            ProtectionFlags::NONE
        }
    }

    /// Sets the mask at block-local coordinates. Out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, mask: ProtectionFlags) {
        if x < self.width && y < self.height {
            self.masks[y * self.width + x] = mask;
        }
    }
}

/// The protection layer of a world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtectionOverlay {
    width: usize,
    height: usize,
    masks: Vec<ProtectionFlags>,
}

impl ProtectionOverlay {
    /// Creates an unprotected overlay.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            masks: vec![ProtectionFlags::NONE; width * height],
        }
    }

    #[inline]
    fn index(&self, pos: TilePos) -> Option<usize> {
        if pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
        {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    /// Mask at a position. Outside the overlay everything is unprotected.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: TilePos) -> ProtectionFlags {
        self.index(pos)
            .map_or(ProtectionFlags::NONE, |i| self.masks[i])
    }

    /// ORs flags into one cell. Outside positions are ignored.
    pub fn protect(&mut self, pos: TilePos, mask: ProtectionFlags) {
        if let Some(i) = self.index(pos) {
            self.masks[i] |= mask;
        }
    }

    /// Assigns `mask` to every cell of an inclusive rectangle, clipped to the overlay.
    ///
    /// # Errors
    ///
    /// Returns `InvertedRect` (and changes nothing) if min > max on either axis.
    pub fn set_protection(&mut self, rect: TileRect, mask: ProtectionFlags) -> CoreResult<()> {
        if rect.is_inverted() {
            return Err(CoreError::InvertedRect {
                min_x: rect.min_x,
                min_y: rect.min_y,
                max_x: rect.max_x,
                max_y: rect.max_y,
            });
        }
        let Some(clipped) = rect.clipped(self.width, self.height) else {
            return Ok(());
        };
        for y in clipped.min_y..=clipped.max_y {
            let row = y as usize * self.width;
            let start = row + clipped.min_x as usize;
            let end = row + clipped.max_x as usize;
            self.masks[start..=end].fill(mask);
        }
        Ok(())
    }

    /// Removes all protection.
    pub fn clear(&mut self) {
        self.masks.fill(ProtectionFlags::NONE);
    }

    /// Number of cells with any protection.
    #[must_use]
    pub fn protected_count(&self) -> usize {
        self.masks.iter().filter(|m| !m.is_empty()).count()
    }

    /// Writes one tile through the overlay and returns the resulting cell.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` for positions outside the grid.
    pub fn place_tile(
        &self,
        grid: &mut TileGrid,
        catalog: &TileCatalog,
        pos: TilePos,
        incoming: Tile,
    ) -> CoreResult<Tile> {
        let index = grid.checked_index(pos)?;
        let mask = self.get(pos);
        let cell = grid.cell_at_mut(index);
        compose_tile(cell, incoming, mask, catalog);
        Ok(*cell)
    }

    /// Stamps a block of tiles at `origin`, then ORs the mask block into the overlay.
    ///
    /// Cells falling outside the grid are skipped.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` (and changes nothing) if the blocks differ in size.
    pub fn place_tiles(
        &mut self,
        grid: &mut TileGrid,
        catalog: &TileCatalog,
        tiles: &TileGrid,
        masks: &MaskBlock,
        origin: TilePos,
    ) -> CoreResult<()> {
        if tiles.width() != masks.width() || tiles.height() != masks.height() {
            return Err(CoreError::DimensionMismatch {
                tiles_width: tiles.width(),
                tiles_height: tiles.height(),
                mask_width: masks.width(),
                mask_height: masks.height(),
            });
        }

        for by in 0..tiles.height() {
            for bx in 0..tiles.width() {
                let pos = origin.offset(bx as i32, by as i32);
                if !grid.in_bounds(pos) {
                    continue;
                }
                let Some(incoming) = tiles.get(TilePos::new(bx as i32, by as i32)) else {
                    continue;
                };
                self.place_tile(grid, catalog, pos, incoming)?;
                self.protect(pos, masks.get(bx, by));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{ids, walls, LiquidKind, Slope};

    fn setup() -> (TileGrid, ProtectionOverlay, TileCatalog) {
        (
            TileGrid::new(8, 8),
            ProtectionOverlay::new(8, 8),
            TileCatalog::standard(),
        )
    }

    #[test]
    fn test_unprotected_cell_adopts_everything() {
        let (mut grid, overlay, catalog) = setup();
        let pos = TilePos::new(2, 3);
        grid.set(pos, Tile::solid(ids::DIRT).with_wall(walls::DIRT)).unwrap();

        let incoming = Tile::solid(ids::STONE)
            .with_frame(18, 36)
            .with_slope(Slope::BottomLeft)
            .with_liquid(0, LiquidKind::Water)
            .with_wiring(Wiring::BLUE);
        let result = overlay.place_tile(&mut grid, &catalog, pos, incoming).unwrap();

        assert_eq!(result, incoming);
        assert_eq!(grid.get(pos), Some(incoming));
    }

    #[test]
    fn test_tile_type_mask_keeps_identity_but_updates_rest() {
        let (mut grid, mut overlay, catalog) = setup();
        let pos = TilePos::new(1, 1);
        let existing = Tile::solid(ids::GRAY_BRICK)
            .with_frame(54, 0)
            .with_half_brick(true);
        grid.set(pos, existing).unwrap();
        overlay.protect(pos, ProtectionFlags::TILE_TYPE);

        let incoming = Tile::solid(ids::STONE)
            .with_wall(walls::STONE)
            .with_liquid(128, LiquidKind::Honey)
            .with_wiring(Wiring::RED.with(Wiring::ACTUATOR));
        let result = overlay.place_tile(&mut grid, &catalog, pos, incoming).unwrap();

        assert_eq!(result.tile_type, ids::GRAY_BRICK);
        assert_eq!((result.frame_x, result.frame_y), (54, 0));
        assert!(result.is_half_brick());
        assert_eq!(result.wall, walls::STONE);
        assert_eq!(result.liquid, 128);
        assert_eq!(result.liquid_kind(), LiquidKind::Honey);
        assert!(result.wiring().has(Wiring::RED));
        assert!(result.wiring().has(Wiring::ACTUATOR));
    }

    #[test]
    fn test_tile_type_mask_accepts_same_type() {
        let (mut grid, mut overlay, catalog) = setup();
        let pos = TilePos::new(1, 1);
        grid.set(pos, Tile::solid(ids::STONE)).unwrap();
        overlay.protect(pos, ProtectionFlags::TILE_TYPE);

        let result = overlay
            .place_tile(&mut grid, &catalog, pos, Tile::solid(ids::STONE).with_frame(18, 18))
            .unwrap();
        assert_eq!((result.frame_x, result.frame_y), (18, 18));
    }

    #[test]
    fn test_solid_mask_rejects_carving() {
        let (mut grid, mut overlay, catalog) = setup();
        let pos = TilePos::new(4, 4);
        grid.set(pos, Tile::solid(ids::GRAY_BRICK)).unwrap();
        overlay.protect(pos, ProtectionFlags::SOLID);

        let result = overlay.place_tile(&mut grid, &catalog, pos, Tile::EMPTY).unwrap();
        assert!(result.is_active());
        assert_eq!(result.tile_type, ids::GRAY_BRICK);

        // A solid replacement still goes through.
        let result = overlay
            .place_tile(&mut grid, &catalog, pos, Tile::solid(ids::STONE))
            .unwrap();
        assert_eq!(result.tile_type, ids::STONE);
    }

    #[test]
    fn test_top_solid_accepts_platforms_side_solid_does_not() {
        let (mut grid, mut overlay, catalog) = setup();
        let top = TilePos::new(0, 0);
        let side = TilePos::new(1, 0);
        overlay.protect(top, ProtectionFlags::TOP_SOLID);
        overlay.protect(side, ProtectionFlags::LEFT_SOLID);

        let platform = Tile::solid(ids::PLATFORM);
        assert!(overlay.place_tile(&mut grid, &catalog, top, platform).unwrap().is_active());
        assert!(!overlay.place_tile(&mut grid, &catalog, side, platform).unwrap().is_active());
    }

    #[test]
    fn test_wall_and_liquid_flags_are_independent() {
        let (mut grid, mut overlay, catalog) = setup();
        let pos = TilePos::new(3, 3);
        grid.set(pos, Tile::EMPTY.with_wall(walls::PLANK).with_liquid(200, LiquidKind::Water))
            .unwrap();
        overlay.protect(pos, ProtectionFlags::WALL);

        let result = overlay
            .place_tile(&mut grid, &catalog, pos, Tile::solid(ids::DIRT))
            .unwrap();
        assert_eq!(result.wall, walls::PLANK);
        assert_eq!(result.liquid, 0);
        assert!(result.is_active());
    }

    #[test]
    fn test_wire_and_actuator_gates_are_separate() {
        let (mut grid, mut overlay, catalog) = setup();
        let pos = TilePos::new(5, 5);
        grid.set(pos, Tile::EMPTY.with_wiring(Wiring::GREEN)).unwrap();
        overlay.protect(pos, ProtectionFlags::WIRE);

        let result = overlay
            .place_tile(&mut grid, &catalog, pos, Tile::EMPTY.with_wiring(Wiring::ACTUATOR))
            .unwrap();
        assert!(result.wiring().has(Wiring::GREEN));
        assert!(result.wiring().has(Wiring::ACTUATOR));
    }

    #[test]
    fn test_place_tile_out_of_bounds() {
        let (mut grid, overlay, catalog) = setup();
        let err = overlay
            .place_tile(&mut grid, &catalog, TilePos::new(8, 0), Tile::solid(1))
            .unwrap_err();
        assert!(matches!(err, CoreError::OutOfBounds { .. }));
    }

    #[test]
    fn test_place_tiles_rejects_mismatched_blocks() {
        let (mut grid, mut overlay, catalog) = setup();
        let tiles = TileGrid::new(3, 2);
        let masks = MaskBlock::new(2, 3);
        let before = grid.clone();

        let err = overlay
            .place_tiles(&mut grid, &catalog, &tiles, &masks, TilePos::new(0, 0))
            .unwrap_err();
        assert!(matches!(err, CoreError::DimensionMismatch { .. }));
        assert_eq!(grid, before);
        assert_eq!(overlay.protected_count(), 0);
    }

    #[test]
    fn test_place_tiles_accumulates_protection() {
        let (mut grid, mut overlay, catalog) = setup();
        let mut tiles = TileGrid::new(2, 2);
        tiles.fill(Tile::solid(ids::WOOD));
        let pos = TilePos::new(6, 6);
        overlay.protect(pos, ProtectionFlags::WALL);

        let masks = MaskBlock::filled(2, 2, ProtectionFlags::TILE_TYPE);
        overlay
            .place_tiles(&mut grid, &catalog, &tiles, &masks, pos)
            .unwrap();

        assert_eq!(grid.get(pos).map(|t| t.tile_type), Some(ids::WOOD));
        assert_eq!(
            overlay.get(pos),
            ProtectionFlags::WALL | ProtectionFlags::TILE_TYPE
        );
        assert_eq!(overlay.protected_count(), 4);
        assert!(grid.get(TilePos::new(7, 7)).unwrap().is_active());
    }

    #[test]
    fn test_place_tiles_clips_to_grid() {
        let (mut grid, mut overlay, catalog) = setup();
        let mut tiles = TileGrid::new(3, 3);
        tiles.fill(Tile::solid(ids::CLAY));
        let masks = MaskBlock::filled(3, 3, ProtectionFlags::ALL);

        overlay
            .place_tiles(&mut grid, &catalog, &tiles, &masks, TilePos::new(7, 7))
            .unwrap();

        assert_eq!(overlay.protected_count(), 1);
        assert_eq!(grid.count(Tile::is_active), 1);
    }

    #[test]
    fn test_set_protection_assigns() {
        let (_, mut overlay, _) = setup();
        let rect = TileRect::new(1, 1, 3, 2).unwrap();
        overlay.protect(TilePos::new(1, 1), ProtectionFlags::WALL);
        overlay
            .set_protection(rect, ProtectionFlags::LIQUID)
            .unwrap();

        assert_eq!(overlay.get(TilePos::new(1, 1)), ProtectionFlags::LIQUID);
        assert_eq!(overlay.protected_count(), 6);
    }

    #[test]
    fn test_set_protection_inverted_changes_nothing() {
        let (_, mut overlay, _) = setup();
        let inverted = TileRect {
            min_x: 4,
            min_y: 0,
            max_x: 2,
            max_y: 5,
        };
        let err = overlay
            .set_protection(inverted, ProtectionFlags::ALL)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvertedRect { .. }));
        assert_eq!(overlay.protected_count(), 0);
    }

    #[test]
    fn test_clear() {
        let (_, mut overlay, _) = setup();
        overlay
            .set_protection(TileRect::from_size(0, 0, 8, 8), ProtectionFlags::ALL)
            .unwrap();
        overlay.clear();
        assert_eq!(overlay.protected_count(), 0);
    }
}
