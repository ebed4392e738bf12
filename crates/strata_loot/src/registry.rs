//! # Loot Registry
//!
//! Named items, slots and chest templates, loaded from TOML and validated
//! once before any resolution happens.
//!
//! ## Validation
//!
//! 1. Every item has `min_stack <= max_stack` and a finite, non-negative probability
//! 2. Every slot entry and chest slot names something that exists
//! 3. Every count range has `min <= max`
//! 4. Slot references form a DAG (DFS cycle detection)

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::defs::{ChestTemplate, EntryTarget, ItemDef, ItemSlot, SlotEntry};
use crate::error::{LootError, LootResult};

/// All loot definitions, keyed by name.
///
/// Maps are ordered so validation and error reporting are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LootRegistry {
    /// Items by name.
    #[serde(default)]
    pub items: BTreeMap<String, ItemDef>,
    /// Slots by name.
    #[serde(default)]
    pub slots: BTreeMap<String, ItemSlot>,
    /// Chest templates by name.
    #[serde(default)]
    pub chests: BTreeMap<String, ChestTemplate>,
}

fn check_count(owner: &str, what: &'static str, min: u32, max: u32) -> LootResult<()> {
    if min > max {
        return Err(LootError::InvalidRange {
            owner: owner.to_string(),
            what,
            min,
            max,
        });
    }
    Ok(())
}

fn check_weight(owner: &str, what: &'static str, value: f64) -> LootResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(LootError::InvalidWeight {
            owner: owner.to_string(),
            what,
            value,
        });
    }
    Ok(())
}

impl LootRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for malformed TOML, otherwise the first
    /// validation failure.
    pub fn from_toml_str(source: &str) -> LootResult<Self> {
        let registry: Self =
            toml::from_str(source).map_err(|e| LootError::InvalidConfig(e.to_string()))?;
        registry.validate()?;
        Ok(registry)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_path(path: impl AsRef<Path>) -> LootResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| LootError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Adds an item. Not validated until [`validate`](Self::validate).
    pub fn add_item(&mut self, name: impl Into<String>, item: ItemDef) {
        self.items.insert(name.into(), item);
    }

    /// Adds a slot. Not validated until [`validate`](Self::validate).
    pub fn add_slot(&mut self, name: impl Into<String>, slot: ItemSlot) {
        self.slots.insert(name.into(), slot);
    }

    /// Adds a chest template. Not validated until [`validate`](Self::validate).
    pub fn add_chest(&mut self, name: impl Into<String>, chest: ChestTemplate) {
        self.chests.insert(name.into(), chest);
    }

    /// Looks up an item.
    ///
    /// # Errors
    ///
    /// Returns `UnknownItem` if absent.
    pub fn item(&self, name: &str) -> LootResult<&ItemDef> {
        self.items
            .get(name)
            .ok_or_else(|| LootError::UnknownItem(name.to_string()))
    }

    /// Looks up a slot.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSlot` if absent.
    pub fn slot(&self, name: &str) -> LootResult<&ItemSlot> {
        self.slots
            .get(name)
            .ok_or_else(|| LootError::UnknownSlot(name.to_string()))
    }

    /// Looks up a chest template.
    ///
    /// # Errors
    ///
    /// Returns `UnknownChest` if absent.
    pub fn chest(&self, name: &str) -> LootResult<&ChestTemplate> {
        self.chests
            .get(name)
            .ok_or_else(|| LootError::UnknownChest(name.to_string()))
    }

    /// Effective selection weight of a slot entry.
    ///
    /// # Errors
    ///
    /// Returns `UnknownItem` for an item entry without an explicit weight
    /// whose item is missing.
    pub fn entry_weight(&self, entry: &SlotEntry) -> LootResult<f64> {
        if let Some(weight) = entry.weight {
            return Ok(weight);
        }
        match &entry.target {
            EntryTarget::Item(name) => Ok(self.item(name)?.probability),
            EntryTarget::Slot(_) => Ok(1.0),
        }
    }

    /// Checks every definition and reference, then looks for slot cycles.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, in name order.
    pub fn validate(&self) -> LootResult<()> {
        for (name, item) in &self.items {
            check_count(
                name,
                "stack",
                u32::from(item.min_stack),
                u32::from(item.max_stack),
            )?;
            check_weight(name, "probability", item.probability)?;
        }

        for (name, slot) in &self.slots {
            for entry in &slot.entries {
                match &entry.target {
                    EntryTarget::Item(item) => {
                        self.item(item)?;
                    }
                    EntryTarget::Slot(nested) => {
                        self.slot(nested)?;
                    }
                }
                check_weight(name, "entry weight", self.entry_weight(entry)?)?;
                check_count(name, "entry count", entry.min_count, entry.max_count)?;
            }
        }

        for (name, chest) in &self.chests {
            for slot_ref in &chest.slots {
                self.slot(&slot_ref.slot)?;
                check_weight(name, "slot probability", slot_ref.probability)?;
                check_count(name, "slot count", slot_ref.min_count, slot_ref.max_count)?;
            }
        }

        if let Some(cycle) = self.find_cycle() {
            return Err(LootError::CycleDetected(cycle));
        }
        Ok(())
    }

    /// Finds a loop of nested slot references, if any.
    ///
    /// The returned path starts and ends with the same slot name.
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();
        let mut path = Vec::new();

        for name in self.slots.keys() {
            if !visited.contains(name.as_str()) {
                if let Some(cycle) =
                    self.dfs_find_cycle(name, &mut visited, &mut on_stack, &mut path)
                {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn dfs_find_cycle<'a>(
        &'a self,
        name: &'a str,
        visited: &mut HashSet<&'a str>,
        on_stack: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        visited.insert(name);
        on_stack.insert(name);
        path.push(name);

        if let Some(slot) = self.slots.get(name) {
            for entry in &slot.entries {
                let EntryTarget::Slot(nested) = &entry.target else {
                    continue;
                };
                let nested = nested.as_str();

                if !visited.contains(nested) {
                    if let Some(cycle) = self.dfs_find_cycle(nested, visited, on_stack, path) {
                        return Some(cycle);
                    }
                } else if on_stack.contains(nested) {
                    let start = path.iter().position(|&n| n == nested).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|n| (*n).to_string()).collect();
                    cycle.push(nested.to_string());
                    return Some(cycle);
                }
            }
        }

        path.pop();
        on_stack.remove(name);
        None
    }
}
