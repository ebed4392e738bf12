//! # Tile Catalog
//!
//! Per-type traits the protection overlay consults when deciding whether an
//! incoming tile may replace a protected one.
//!
//! The host engine owns the real material table; `TileCatalog::standard()`
//! covers the ids in [`crate::tile::ids`].

use crate::tile::ids;

/// Traits of one tile type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileTraits(u8);

impl TileTraits {
    /// No traits (decoration, furniture).
    pub const NONE: Self = Self(0);
    /// Blocks movement from every side.
    pub const SOLID: Self = Self(1 << 0);
    /// Can be stood on but not collided with from below (platforms, tables).
    pub const SOLID_TOP: Self = Self(1 << 1);

    /// Checks if a trait is set.
    #[inline]
    #[must_use]
    pub const fn has(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

/// Lookup table of tile traits indexed by tile type.
#[derive(Clone, Debug)]
pub struct TileCatalog {
    traits: Vec<TileTraits>,
}

impl TileCatalog {
    /// Number of tile types the standard catalog describes.
    pub const STANDARD_TYPE_COUNT: usize = 256;

    /// Creates a catalog where every type has no traits.
    #[must_use]
    pub fn empty(type_count: usize) -> Self {
        Self {
            traits: vec![TileTraits::NONE; type_count],
        }
    }

    /// Creates the catalog for the built-in tile ids.
    ///
    /// Every type is solid except furniture, torches, platforms and chests;
    /// platforms, tables and work benches are solid-top.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self {
            traits: vec![TileTraits::SOLID; Self::STANDARD_TYPE_COUNT],
        };
        catalog.set(ids::TORCH, TileTraits::NONE);
        catalog.set(ids::CHEST, TileTraits::NONE);
        catalog.set(ids::PLATFORM, TileTraits::SOLID_TOP);
        catalog.set(ids::TABLE, TileTraits::SOLID_TOP);
        catalog.set(ids::WORK_BENCH, TileTraits::SOLID_TOP);
        catalog
    }

    /// Sets the traits of a tile type, growing the table if needed.
    pub fn set(&mut self, tile_type: u16, traits: TileTraits) {
        let index = usize::from(tile_type);
        if index >= self.traits.len() {
            self.traits.resize(index + 1, TileTraits::NONE);
        }
        self.traits[index] = traits;
    }

    /// Returns the traits of a tile type. Unknown types have no traits.
    #[inline]
    #[must_use]
    pub fn traits(&self, tile_type: u16) -> TileTraits {
        self.traits
            .get(usize::from(tile_type))
            .copied()
            .unwrap_or(TileTraits::NONE)
    }

    /// Returns true if the type blocks movement from every side.
    #[inline]
    #[must_use]
    pub fn is_solid(&self, tile_type: u16) -> bool {
        self.traits(tile_type).has(TileTraits::SOLID)
    }

    /// Returns true if the type is platform-like.
    #[inline]
    #[must_use]
    pub fn is_solid_top(&self, tile_type: u16) -> bool {
        self.traits(tile_type).has(TileTraits::SOLID_TOP)
    }

    /// Returns true if something can rest on top of the type.
    #[inline]
    #[must_use]
    pub fn supports_top(&self, tile_type: u16) -> bool {
        self.traits(tile_type)
            .has(TileTraits(TileTraits::SOLID.0 | TileTraits::SOLID_TOP.0))
    }
}

impl Default for TileCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
