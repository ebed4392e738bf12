//! # Tile Grid
//!
//! The world is a flat arena of tiles indexed by computed offset
//! (`y * width + x`). Stages address cells by value, never by reference
//! into the buffer, so a stage can't hold a stale cell across writes.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::tile::Tile;

/// A cell position. Y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl TilePos {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the position offset by (dx, dy).
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Squared Euclidean distance to another position.
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }
}

/// An inclusive rectangle of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    /// Left column (inclusive).
    pub min_x: i32,
    /// Top row (inclusive).
    pub min_y: i32,
    /// Right column (inclusive).
    pub max_x: i32,
    /// Bottom row (inclusive).
    pub max_y: i32,
}

impl TileRect {
    /// Creates a rectangle from inclusive corners.
    ///
    /// # Errors
    ///
    /// Returns `InvertedRect` if min > max on either axis.
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> CoreResult<Self> {
        let rect = Self {
            min_x,
            min_y,
            max_x,
            max_y,
        };
        if rect.is_inverted() {
            return Err(CoreError::InvertedRect {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        }
        Ok(rect)
    }

    /// Creates a rectangle from its top-left corner and a non-zero size.
    #[must_use]
    pub const fn from_size(x: i32, y: i32, width: u32, height: u32) -> Self {
        let width = if width == 0 { 1 } else { width };
        let height = if height == 0 { 1 } else { height };
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width as i32 - 1,
            max_y: y + height as i32 - 1,
        }
    }

    /// Returns true if min > max on either axis.
    #[inline]
    #[must_use]
    pub const fn is_inverted(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Width in cells.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    /// Height in cells.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }

    /// Returns true if the position lies inside.
    #[inline]
    #[must_use]
    pub const fn contains(&self, pos: TilePos) -> bool {
        pos.x >= self.min_x && pos.x <= self.max_x && pos.y >= self.min_y && pos.y <= self.max_y
    }

    /// Returns true if the two rectangles share at least one cell.
    #[inline]
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Returns true if `other` lies completely inside.
    #[inline]
    #[must_use]
    pub const fn encloses(&self, other: &Self) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Grows the rectangle by `margin` cells on every side.
    #[inline]
    #[must_use]
    pub const fn expanded(&self, margin: i32) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Clips to a grid of the given size. `None` if nothing is left.
    #[must_use]
    pub fn clipped(&self, width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let clipped = Self {
            min_x: self.min_x.max(0),
            min_y: self.min_y.max(0),
            max_x: self.max_x.min(width as i32 - 1),
            max_y: self.max_y.min(height as i32 - 1),
        };
        (!clipped.is_inverted()).then_some(clipped)
    }

    /// Iterates every position, row by row.
    pub fn positions(&self) -> impl Iterator<Item = TilePos> {
        let rect = *self;
        (rect.min_y..=rect.max_y)
            .flat_map(move |y| (rect.min_x..=rect.max_x).map(move |x| TilePos::new(x, y)))
    }
}

/// The world grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl TileGrid {
    /// Creates a grid of empty tiles.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Tile::EMPTY; width * height],
        }
    }

    /// Grid width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// The whole grid as a rectangle.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> TileRect {
        TileRect {
            min_x: 0,
            min_y: 0,
            max_x: self.width as i32 - 1,
            max_y: self.height as i32 - 1,
        }
    }

    /// Returns true if the position is inside the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Flat buffer offset of a position.
    #[inline]
    #[must_use]
    pub const fn index(&self, pos: TilePos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    /// Returns the tile at a position.
    #[inline]
    #[must_use]
    pub fn get(&self, pos: TilePos) -> Option<Tile> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Returns a mutable reference to the tile at a position.
    #[inline]
    pub fn get_mut(&mut self, pos: TilePos) -> Option<&mut Tile> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    /// Overwrites the tile at a position, ignoring protection.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` for positions outside the grid.
    pub fn set(&mut self, pos: TilePos, tile: Tile) -> CoreResult<()> {
        let index = self.checked_index(pos)?;
        self.cells[index] = tile;
        Ok(())
    }

    /// Flat buffer offset, or `OutOfBounds`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` for positions outside the grid.
    pub fn checked_index(&self, pos: TilePos) -> CoreResult<usize> {
        self.index(pos).ok_or(CoreError::OutOfBounds {
            x: pos.x,
            y: pos.y,
            width: self.width,
            height: self.height,
        })
    }

    /// Sets every cell to `tile`.
    pub fn fill(&mut self, tile: Tile) {
        self.cells.fill(tile);
    }

    /// Resets every cell to empty.
    pub fn reset(&mut self) {
        self.fill(Tile::EMPTY);
    }

    /// All cells in row-major order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    /// Mutable cell by flat offset. Callers validate the offset first.
    #[inline]
    pub(crate) fn cell_at_mut(&mut self, index: usize) -> &mut Tile {
        &mut self.cells[index]
    }

    /// One row of cells.
    #[must_use]
    pub fn row(&self, y: usize) -> Option<&[Tile]> {
        (y < self.height).then(|| &self.cells[y * self.width..(y + 1) * self.width])
    }

    /// The raw bytes of the grid, for determinism checks and hashing.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }

    /// Counts cells matching a predicate.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&Tile) -> bool) -> usize {
        self.cells.iter().filter(|t| predicate(t)).count()
    }
}
