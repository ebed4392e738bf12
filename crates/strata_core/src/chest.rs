//! # Chest Records
//!
//! Containers placed into the world. A chest is filled in one shot when it is
//! placed and is never touched by the generator afterward.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::grid::TilePos;

/// Slots per chest.
pub const CHEST_CAPACITY: usize = 40;

/// Maximum number of chests a world can hold.
pub const MAX_CHESTS: usize = 8000;

/// One stack of items in a chest slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item id. Zero is "no item".
    pub item_id: i32,
    /// Stack size.
    pub stack: u16,
    /// Prefix (modifier) id.
    pub prefix: u8,
}

impl ItemStack {
    /// An empty slot.
    pub const EMPTY: Self = Self {
        item_id: 0,
        stack: 0,
        prefix: 0,
    };

    /// Creates a stack.
    #[inline]
    #[must_use]
    pub const fn new(item_id: i32, stack: u16, prefix: u8) -> Self {
        Self {
            item_id,
            stack,
            prefix,
        }
    }

    /// Returns true for an empty slot.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item_id == 0 || self.stack == 0
    }
}

/// A placed chest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chest {
    pos: TilePos,
    items: [ItemStack; CHEST_CAPACITY],
}

impl Chest {
    /// Creates an empty chest at a position.
    #[must_use]
    pub const fn new(pos: TilePos) -> Self {
        Self {
            pos,
            items: [ItemStack::EMPTY; CHEST_CAPACITY],
        }
    }

    /// Top-left position of the chest.
    #[inline]
    #[must_use]
    pub const fn pos(&self) -> TilePos {
        self.pos
    }

    /// All slots, empty ones included.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[ItemStack] {
        &self.items
    }

    /// Non-empty slots in order.
    pub fn items(&self) -> impl Iterator<Item = &ItemStack> {
        self.items.iter().filter(|s| !s.is_empty())
    }

    /// Number of non-empty slots.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items().count()
    }

    /// Replaces the contents, starting at slot 0.
    ///
    /// Items past capacity are dropped. Returns how many were stored.
    pub fn set_items(&mut self, items: &[ItemStack]) -> usize {
        let stored = items.len().min(CHEST_CAPACITY);
        self.items = [ItemStack::EMPTY; CHEST_CAPACITY];
        self.items[..stored].copy_from_slice(&items[..stored]);
        stored
    }
}

/// Opaque reference to a chest in a [`ChestStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChestHandle(usize);

impl ChestHandle {
    /// Position of the chest in placement order.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// All chests of a world, in placement order.
#[derive(Clone, Debug)]
pub struct ChestStore {
    chests: Vec<Chest>,
    limit: usize,
}

impl ChestStore {
    /// Creates an empty store holding at most [`MAX_CHESTS`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(MAX_CHESTS)
    }

    /// Creates an empty store with a custom limit (capped at [`MAX_CHESTS`]).
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            chests: Vec::new(),
            limit: limit.min(MAX_CHESTS),
        }
    }

    /// Adds a chest.
    ///
    /// # Errors
    ///
    /// Returns `ChestLimit` once the store is full.
    pub fn add(&mut self, chest: Chest) -> CoreResult<ChestHandle> {
        if self.chests.len() >= self.limit {
            return Err(CoreError::ChestLimit(self.limit));
        }
        self.chests.push(chest);
        Ok(ChestHandle(self.chests.len() - 1))
    }

    /// Looks up a chest.
    #[must_use]
    pub fn get(&self, handle: ChestHandle) -> Option<&Chest> {
        self.chests.get(handle.0)
    }

    /// Looks up a chest for filling.
    ///
    /// # Errors
    ///
    /// Returns `UnknownChest` for a handle from another store.
    pub fn get_mut(&mut self, handle: ChestHandle) -> CoreResult<&mut Chest> {
        self.chests
            .get_mut(handle.0)
            .ok_or(CoreError::UnknownChest(handle.0))
    }

    /// Finds the chest placed at a position.
    #[must_use]
    pub fn find_at(&self, pos: TilePos) -> Option<ChestHandle> {
        self.chests
            .iter()
            .position(|c| c.pos == pos)
            .map(ChestHandle)
    }

    /// Number of chests.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chests.len()
    }

    /// Returns true if no chest was placed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chests.is_empty()
    }

    /// Returns true if no more chests fit.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.chests.len() >= self.limit
    }

    /// Iterates chests in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &Chest> {
        self.chests.iter()
    }

    /// Removes every chest.
    pub fn clear(&mut self) {
        self.chests.clear();
    }
}

impl Default for ChestStore {
    fn default() -> Self {
        Self::new()
    }
}
