//! # Loot Resolver
//!
//! Expands a chest template into concrete item stacks.
//!
//! ## Resolution
//!
//! ```text
//! for each SlotRef in template:
//!     roll < probability ?  → resolve slot  count ∈ [min_count, max_count] times
//!
//! resolve slot:
//!     pick one entry by weight (no mass → nothing)
//!     item  → one stack, size ∈ [min_stack, max_stack]
//!     slot  → resolve nested slot count ∈ [entry.min_count, entry.max_count] times
//! ```
//!
//! Everything is resolved first; the list is cut to the chest capacity
//! afterwards, so the draw sequence does not depend on capacity.

use rand::Rng;
use strata_core::{Chest, ItemStack, CHEST_CAPACITY};
use strata_procedural::select_weighted;

use crate::defs::EntryTarget;
use crate::error::{LootError, LootResult};
use crate::registry::LootRegistry;

/// Deepest slot nesting the resolver follows.
pub const MAX_SLOT_DEPTH: usize = 32;

/// Draws uniformly from `min..=max`, rejecting inverted ranges.
fn draw_count<R: Rng + ?Sized>(
    owner: &str,
    what: &'static str,
    min: u32,
    max: u32,
    rng: &mut R,
) -> LootResult<u32> {
    if min > max {
        return Err(LootError::InvalidRange {
            owner: owner.to_string(),
            what,
            min,
            max,
        });
    }
    Ok(rng.gen_range(min..=max))
}

/// Resolves chest templates from a registry.
#[derive(Clone, Copy, Debug)]
pub struct LootResolver<'a> {
    registry: &'a LootRegistry,
}

impl<'a> LootResolver<'a> {
    /// Creates a resolver over a registry.
    #[must_use]
    pub const fn new(registry: &'a LootRegistry) -> Self {
        Self { registry }
    }

    /// The registry being resolved.
    #[must_use]
    pub const fn registry(&self) -> &'a LootRegistry {
        self.registry
    }

    /// Resolves a chest template into at most `capacity` stacks.
    ///
    /// `capacity` is clamped to [`CHEST_CAPACITY`].
    ///
    /// # Errors
    ///
    /// Returns `UnknownChest`, `UnknownSlot` or `UnknownItem` for missing
    /// names, `DepthExceeded` for runaway nesting and `InvalidRange` for
    /// inverted count or stack ranges.
    pub fn resolve_chest<R: Rng + ?Sized>(
        &self,
        template: &str,
        capacity: usize,
        rng: &mut R,
    ) -> LootResult<Vec<ItemStack>> {
        let chest = self.registry.chest(template)?;
        let mut items = Vec::new();

        for slot_ref in &chest.slots {
            let roll: f64 = rng.gen();
            if roll >= slot_ref.probability {
                continue;
            }
            let count = draw_count(
                template,
                "slot count",
                slot_ref.min_count,
                slot_ref.max_count,
                rng,
            )?;
            for _ in 0..count {
                self.resolve_slot(&slot_ref.slot, 0, rng, &mut items)?;
            }
        }

        let capacity = capacity.min(CHEST_CAPACITY);
        if items.len() > capacity {
            tracing::debug!(
                template,
                resolved = items.len(),
                capacity,
                "chest contents truncated"
            );
            items.truncate(capacity);
        }
        Ok(items)
    }

    /// Resolves one slot, appending stacks to `out`.
    ///
    /// # Errors
    ///
    /// As [`resolve_chest`](Self::resolve_chest).
    pub fn resolve_slot<R: Rng + ?Sized>(
        &self,
        name: &str,
        depth: usize,
        rng: &mut R,
        out: &mut Vec<ItemStack>,
    ) -> LootResult<()> {
        if depth >= MAX_SLOT_DEPTH {
            return Err(LootError::DepthExceeded {
                slot: name.to_string(),
                depth: MAX_SLOT_DEPTH,
            });
        }

        let slot = self.registry.slot(name)?;
        let weights = slot
            .entries
            .iter()
            .map(|e| self.registry.entry_weight(e))
            .collect::<LootResult<Vec<f64>>>()?;

        let Some(index) = select_weighted(&weights, rng) else {
            return Ok(());
        };
        let entry = &slot.entries[index];

        match &entry.target {
            EntryTarget::Item(item_name) => {
                let item = self.registry.item(item_name)?;
                let stack = draw_count(
                    item_name,
                    "stack",
                    u32::from(item.min_stack),
                    u32::from(item.max_stack),
                    rng,
                )?;
                out.push(ItemStack::new(item.id, stack as u16, item.prefix));
            }
            EntryTarget::Slot(nested) => {
                let count = draw_count(name, "entry count", entry.min_count, entry.max_count, rng)?;
                for _ in 0..count {
                    self.resolve_slot(nested, depth + 1, rng, out)?;
                }
            }
        }
        Ok(())
    }

    /// Resolves a template straight into a chest. Returns the stacks stored.
    ///
    /// # Errors
    ///
    /// As [`resolve_chest`](Self::resolve_chest).
    pub fn fill_chest<R: Rng + ?Sized>(
        &self,
        chest: &mut Chest,
        template: &str,
        rng: &mut R,
    ) -> LootResult<usize> {
        let items = self.resolve_chest(template, CHEST_CAPACITY, rng)?;
        Ok(chest.set_items(&items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{ChestTemplate, ItemDef, ItemSlot, SlotEntry, SlotRef};
    use strata_core::TilePos;
    use strata_procedural::WorldSeed;

    fn registry() -> LootRegistry {
        let mut registry = LootRegistry::new();
        registry.add_item("torch", ItemDef::new(8).with_stack(5, 15));
        registry.add_item("rope", ItemDef::new(965).with_stack(50, 50));
        registry.add_item("never", ItemDef::new(1).with_probability(0.0));
        registry.add_slot(
            "basics",
            ItemSlot::new(vec![
                SlotEntry::item("torch"),
                SlotEntry::item("rope"),
                SlotEntry::item("never"),
            ]),
        );
        registry.add_slot(
            "bundle",
            ItemSlot::new(vec![SlotEntry::slot("basics").times(3, 3)]),
        );
        registry.add_chest(
            "small",
            ChestTemplate::new(21).with_slot(SlotRef::new("basics").times(2, 2)),
        );
        registry.add_chest(
            "huge",
            ChestTemplate::new(21).with_slot(SlotRef::new("bundle").times(20, 20)),
        );
        registry.validate().unwrap();
        registry
    }

    #[test]
    fn test_resolve_small_chest() {
        let registry = registry();
        let resolver = LootResolver::new(&registry);
        let items = resolver
            .resolve_chest("small", CHEST_CAPACITY, &mut WorldSeed::new(1).rng())
            .unwrap();

        assert_eq!(items.len(), 2);
        for item in &items {
            match item.item_id {
                8 => assert!((5..=15).contains(&item.stack)),
                965 => assert_eq!(item.stack, 50),
                other => panic!("unexpected item {other}"),
            }
        }
    }

    #[test]
    fn test_nested_counts_multiply() {
        let registry = registry();
        let resolver = LootResolver::new(&registry);
        let items = resolver
            .resolve_chest("huge", 1000, &mut WorldSeed::new(2).rng())
            .unwrap();
        assert_eq!(items.len(), CHEST_CAPACITY);
    }

    #[test]
    fn test_capacity_truncation_keeps_prefix() {
        let registry = registry();
        let resolver = LootResolver::new(&registry);
        let full = resolver
            .resolve_chest("huge", CHEST_CAPACITY, &mut WorldSeed::new(3).rng())
            .unwrap();
        let cut = resolver
            .resolve_chest("huge", 7, &mut WorldSeed::new(3).rng())
            .unwrap();
        assert_eq!(cut.len(), 7);
        assert_eq!(cut[..], full[..7]);
    }

    #[test]
    fn test_skipped_slot_roll() {
        let mut registry = registry();
        registry.add_chest(
            "empty",
            ChestTemplate::new(21).with_slot(SlotRef::new("basics").with_probability(0.0)),
        );
        let resolver = LootResolver::new(&registry);
        let items = resolver
            .resolve_chest("empty", CHEST_CAPACITY, &mut WorldSeed::new(4).rng())
            .unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_unknown_chest() {
        let registry = registry();
        let resolver = LootResolver::new(&registry);
        let err = resolver
            .resolve_chest("missing", 10, &mut WorldSeed::new(1).rng())
            .unwrap_err();
        assert_eq!(err, LootError::UnknownChest("missing".into()));
    }

    #[test]
    fn test_depth_bound_stops_unvalidated_cycle() {
        let mut registry = LootRegistry::new();
        registry.add_slot("a", ItemSlot::new(vec![SlotEntry::slot("b")]));
        registry.add_slot("b", ItemSlot::new(vec![SlotEntry::slot("a")]));
        registry.add_chest("trap", ChestTemplate::new(21).with_slot(SlotRef::new("a")));

        let resolver = LootResolver::new(&registry);
        let err = resolver
            .resolve_chest("trap", 10, &mut WorldSeed::new(1).rng())
            .unwrap_err();
        assert!(matches!(err, LootError::DepthExceeded { depth: MAX_SLOT_DEPTH, .. }));
    }

    #[test]
    fn test_fill_chest() {
        let registry = registry();
        let resolver = LootResolver::new(&registry);
        let mut chest = Chest::new(TilePos::new(4, 4));
        let stored = resolver
            .fill_chest(&mut chest, "small", &mut WorldSeed::new(5).rng())
            .unwrap();
        assert_eq!(stored, 2);
        assert_eq!(chest.item_count(), 2);
    }
}
