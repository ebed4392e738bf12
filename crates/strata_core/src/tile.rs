//! # Tile Cell
//!
//! A single cell of the world grid.
//!
//! ## Layout
//!
//! Tiles are 16-byte `Pod` records so a whole grid can be viewed as bytes
//! (used for determinism checks) without any per-field encoding:
//!
//! ```text
//! [u16 type][i16 frame_x][i16 frame_y][u16 wall]
//! [u8 active][u8 half][u8 slope][u8 liquid][u8 liquid_kind]
//! [u8 tile_color][u8 wall_color][u8 wiring]
//! ```
//!
//! ## Field Validity
//!
//! - Frame coordinates only mean something while `active != 0`
//! - `liquid_kind` only means something while `liquid > 0`
//! - `wall_color` only means something while `wall != 0`

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Built-in tile type ids.
///
/// The host engine owns the authoritative id space; these are the ids the
/// built-in stages paint with.
pub mod ids {
    /// Dirt block.
    pub const DIRT: u16 = 0;
    /// Stone block.
    pub const STONE: u16 = 1;
    /// Grass-covered dirt.
    pub const GRASS: u16 = 2;
    /// Torch.
    pub const TORCH: u16 = 4;
    /// Table.
    pub const TABLE: u16 = 14;
    /// Work bench.
    pub const WORK_BENCH: u16 = 18;
    /// Wooden platform.
    pub const PLATFORM: u16 = 19;
    /// Chest.
    pub const CHEST: u16 = 21;
    /// Wood planks.
    pub const WOOD: u16 = 30;
    /// Gray brick.
    pub const GRAY_BRICK: u16 = 38;
    /// Clay block.
    pub const CLAY: u16 = 40;
    /// Sand block.
    pub const SAND: u16 = 53;
    /// Ash block.
    pub const ASH: u16 = 57;
    /// Mud block.
    pub const MUD: u16 = 59;
    /// Silt block.
    pub const SILT: u16 = 123;
}

/// Built-in wall ids. Zero means "no wall".
pub mod walls {
    /// No wall.
    pub const NONE: u16 = 0;
    /// Stone wall.
    pub const STONE: u16 = 1;
    /// Dirt wall.
    pub const DIRT: u16 = 2;
    /// Wood plank wall.
    pub const PLANK: u16 = 4;
    /// Gray brick wall.
    pub const GRAY_BRICK: u16 = 5;
}

/// Slope variant of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Slope {
    /// Full, unsloped tile.
    #[default]
    None = 0,
    /// Sloped with the high side on the top right.
    TopRight = 1,
    /// Sloped with the high side on the top left.
    TopLeft = 2,
    /// Sloped with the high side on the bottom right.
    BottomRight = 3,
    /// Sloped with the high side on the bottom left.
    BottomLeft = 4,
}

impl Slope {
    /// Converts from u8. Unknown values map to `None`.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::TopRight,
            2 => Self::TopLeft,
            3 => Self::BottomRight,
            4 => Self::BottomLeft,
            _ => Self::None,
        }
    }
}

/// Liquid kind. Only meaningful when the liquid amount is non-zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LiquidKind {
    /// Water.
    #[default]
    Water = 0,
    /// Lava.
    Lava = 1,
    /// Honey.
    Honey = 2,
}

impl LiquidKind {
    /// Converts from u8. Unknown values map to `Water`.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Lava,
            2 => Self::Honey,
            _ => Self::Water,
        }
    }
}

/// Wire and actuator bits of a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Wiring(u8);

impl Wiring {
    /// No wires, no actuator.
    pub const NONE: Self = Self(0);
    /// Red wire.
    pub const RED: Self = Self(1 << 0);
    /// Blue wire.
    pub const BLUE: Self = Self(1 << 1);
    /// Green wire.
    pub const GREEN: Self = Self(1 << 2);
    /// Yellow wire.
    pub const YELLOW: Self = Self(1 << 3);
    /// Every wire color.
    pub const WIRES: Self = Self(0b1111);
    /// Actuator.
    pub const ACTUATOR: Self = Self(1 << 4);

    /// Creates wiring from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Checks if every bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn has(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Combines two bit sets.
    #[inline]
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// A single tile cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct Tile {
    /// Tile type id.
    pub tile_type: u16,
    /// Frame X (sub-texture selector).
    pub frame_x: i16,
    /// Frame Y (sub-texture selector).
    pub frame_y: i16,
    /// Wall id, 0 = no wall.
    pub wall: u16,
    /// Non-zero when a tile occupies the cell.
    pub active: u8,
    /// Non-zero for half-height tiles.
    pub half_brick: u8,
    /// Raw [`Slope`].
    pub slope: u8,
    /// Liquid amount (0-255).
    pub liquid: u8,
    /// Raw [`LiquidKind`].
    pub liquid_kind: u8,
    /// Tile paint id.
    pub tile_color: u8,
    /// Wall paint id.
    pub wall_color: u8,
    /// Raw [`Wiring`] bits.
    pub wiring: u8,
}

impl Tile {
    /// Empty cell: no tile, no wall, no liquid.
    pub const EMPTY: Self = Self {
        tile_type: 0,
        frame_x: 0,
        frame_y: 0,
        wall: 0,
        active: 0,
        half_brick: 0,
        slope: 0,
        liquid: 0,
        liquid_kind: 0,
        tile_color: 0,
        wall_color: 0,
        wiring: 0,
    };

    /// Creates an active tile of the given type.
    #[inline]
    #[must_use]
    pub const fn solid(tile_type: u16) -> Self {
        let mut tile = Self::EMPTY;
        tile.tile_type = tile_type;
        tile.active = 1;
        tile
    }

    /// Returns true if a tile occupies the cell.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active != 0
    }

    /// Returns true if the tile is half height.
    #[inline]
    #[must_use]
    pub const fn is_half_brick(&self) -> bool {
        self.half_brick != 0
    }

    /// Returns the slope variant.
    #[inline]
    #[must_use]
    pub const fn slope(&self) -> Slope {
        Slope::from_u8(self.slope)
    }

    /// Returns the liquid kind.
    #[inline]
    #[must_use]
    pub const fn liquid_kind(&self) -> LiquidKind {
        LiquidKind::from_u8(self.liquid_kind)
    }

    /// Returns the wiring bits.
    #[inline]
    #[must_use]
    pub const fn wiring(&self) -> Wiring {
        Wiring::from_raw(self.wiring)
    }

    /// Returns true if the cell has a wall.
    #[inline]
    #[must_use]
    pub const fn has_wall(&self) -> bool {
        self.wall != 0
    }

    /// Returns true if the cell holds any liquid.
    #[inline]
    #[must_use]
    pub const fn has_liquid(&self) -> bool {
        self.liquid > 0
    }

    /// Returns true if shape (half height and slope) matches.
    #[inline]
    #[must_use]
    pub const fn same_shape(&self, other: &Self) -> bool {
        (self.half_brick != 0) == (other.half_brick != 0) && self.slope == other.slope
    }

    /// Returns true if frame coordinates match.
    #[inline]
    #[must_use]
    pub const fn same_frame(&self, other: &Self) -> bool {
        self.frame_x == other.frame_x && self.frame_y == other.frame_y
    }

    /// Sets the activity and type, leaving every other field alone.
    #[inline]
    pub fn set_type(&mut self, active: bool, tile_type: u16) {
        self.active = u8::from(active);
        self.tile_type = tile_type;
    }

    /// Sets the frame coordinates.
    #[must_use]
    pub const fn with_frame(mut self, frame_x: i16, frame_y: i16) -> Self {
        self.frame_x = frame_x;
        self.frame_y = frame_y;
        self
    }

    /// Sets the wall id.
    #[must_use]
    pub const fn with_wall(mut self, wall: u16) -> Self {
        self.wall = wall;
        self
    }

    /// Sets liquid amount and kind.
    #[must_use]
    pub const fn with_liquid(mut self, amount: u8, kind: LiquidKind) -> Self {
        self.liquid = amount;
        self.liquid_kind = kind as u8;
        self
    }

    /// Sets the slope.
    #[must_use]
    pub const fn with_slope(mut self, slope: Slope) -> Self {
        self.slope = slope as u8;
        self
    }

    /// Sets the half-height flag.
    #[must_use]
    pub const fn with_half_brick(mut self, half: bool) -> Self {
        self.half_brick = if half { 1 } else { 0 };
        self
    }

    /// Sets the tile paint.
    #[must_use]
    pub const fn with_paint(mut self, color: u8) -> Self {
        self.tile_color = color;
        self
    }

    /// Sets the wall paint.
    #[must_use]
    pub const fn with_wall_paint(mut self, color: u8) -> Self {
        self.wall_color = color;
        self
    }

    /// Sets the wiring bits.
    #[must_use]
    pub const fn with_wiring(mut self, wiring: Wiring) -> Self {
        self.wiring = wiring.raw();
        self
    }
}
