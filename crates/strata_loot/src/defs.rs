//! # Loot Definitions
//!
//! The three entity kinds a loot file declares, all referenced by name:
//!
//! ```text
//! ChestTemplate ──SlotRef──► ItemSlot ──SlotEntry──► ItemDef
//!                               ▲            │
//!                               └────────────┘ (nested slot)
//! ```
//!
//! ## TOML Shape
//!
//! ```toml
//! [items.iron_bar]
//! id = 22
//! min_stack = 3
//! max_stack = 10
//!
//! [slots.bars]
//! entries = [
//!     { target = { item = "iron_bar" } },
//!     { target = { slot = "gems" }, weight = 0.5, min_count = 1, max_count = 2 },
//! ]
//!
//! [chests.cavern]
//! tile_type = 21
//! slots = [{ slot = "bars", probability = 0.5 }]
//! ```

use serde::{Deserialize, Serialize};

const fn one() -> u32 {
    1
}

const fn one_stack() -> u16 {
    1
}

const fn certain() -> f64 {
    1.0
}

/// A concrete item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Item id written into chests.
    pub id: i32,
    /// Prefix (modifier) id.
    #[serde(default)]
    pub prefix: u8,
    /// Smallest stack.
    #[serde(default = "one_stack")]
    pub min_stack: u16,
    /// Largest stack.
    #[serde(default = "one_stack")]
    pub max_stack: u16,
    /// Default selection weight when a slot entry does not set one.
    #[serde(default = "certain")]
    pub probability: f64,
}

impl ItemDef {
    /// Creates an item with a stack of one and full weight.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self {
            id,
            prefix: 0,
            min_stack: 1,
            max_stack: 1,
            probability: 1.0,
        }
    }

    /// Sets the stack range.
    #[must_use]
    pub const fn with_stack(mut self, min: u16, max: u16) -> Self {
        self.min_stack = min;
        self.max_stack = max;
        self
    }

    /// Sets the default weight.
    #[must_use]
    pub const fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }
}

/// What a slot entry points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryTarget {
    /// A terminal item.
    Item(String),
    /// Another slot, resolved recursively.
    Slot(String),
}

/// One weighted choice inside a slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotEntry {
    /// What this entry produces.
    pub target: EntryTarget,
    /// Selection weight. Defaults to the item's probability, or 1 for slots.
    #[serde(default)]
    pub weight: Option<f64>,
    /// Fewest resolutions of a nested slot. Items always yield one stack.
    #[serde(default = "one")]
    pub min_count: u32,
    /// Most resolutions of a nested slot.
    #[serde(default = "one")]
    pub max_count: u32,
}

impl SlotEntry {
    /// An entry yielding one stack of an item.
    #[must_use]
    pub fn item(name: impl Into<String>) -> Self {
        Self {
            target: EntryTarget::Item(name.into()),
            weight: None,
            min_count: 1,
            max_count: 1,
        }
    }

    /// An entry resolving a nested slot once.
    #[must_use]
    pub fn slot(name: impl Into<String>) -> Self {
        Self {
            target: EntryTarget::Slot(name.into()),
            weight: None,
            min_count: 1,
            max_count: 1,
        }
    }

    /// Sets an explicit weight.
    #[must_use]
    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Sets the repeat range.
    #[must_use]
    pub fn times(mut self, min: u32, max: u32) -> Self {
        self.min_count = min;
        self.max_count = max;
        self
    }
}

/// A weighted choice between items and nested slots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemSlot {
    /// Entries; exactly one is picked per resolution.
    #[serde(default)]
    pub entries: Vec<SlotEntry>,
}

impl ItemSlot {
    /// Creates a slot from entries.
    #[must_use]
    pub fn new(entries: Vec<SlotEntry>) -> Self {
        Self { entries }
    }
}

/// A slot a chest template rolls for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotRef {
    /// Slot name.
    pub slot: String,
    /// Chance the slot is rolled at all.
    #[serde(default = "certain")]
    pub probability: f64,
    /// Fewest resolutions when rolled.
    #[serde(default = "one")]
    pub min_count: u32,
    /// Most resolutions when rolled.
    #[serde(default = "one")]
    pub max_count: u32,
}

impl SlotRef {
    /// A slot rolled once with certainty.
    #[must_use]
    pub fn new(slot: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            probability: 1.0,
            min_count: 1,
            max_count: 1,
        }
    }

    /// Sets the roll chance.
    #[must_use]
    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Sets the repeat range.
    #[must_use]
    pub fn times(mut self, min: u32, max: u32) -> Self {
        self.min_count = min;
        self.max_count = max;
        self
    }
}

/// How a kind of chest looks and what it holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChestTemplate {
    /// Tile type of the placed chest.
    pub tile_type: u16,
    /// Style index (selects the frame).
    #[serde(default)]
    pub style: u16,
    /// Tile paint.
    #[serde(default)]
    pub paint: u8,
    /// Slots rolled in order.
    #[serde(default)]
    pub slots: Vec<SlotRef>,
}

impl ChestTemplate {
    /// Horizontal frame offset of one chest style.
    pub const STYLE_FRAME_WIDTH: i16 = 36;

    /// Creates a template with no slots.
    #[must_use]
    pub const fn new(tile_type: u16) -> Self {
        Self {
            tile_type,
            style: 0,
            paint: 0,
            slots: Vec::new(),
        }
    }

    /// Adds a slot roll.
    #[must_use]
    pub fn with_slot(mut self, slot: SlotRef) -> Self {
        self.slots.push(slot);
        self
    }

    /// Frame X of the chest's top-left tile.
    #[must_use]
    pub fn frame_x(&self) -> i16 {
        (self.style as i16).saturating_mul(Self::STYLE_FRAME_WIDTH)
    }
}
