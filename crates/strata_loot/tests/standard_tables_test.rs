//! # Standard Loot Table Tests
//!
//! Loads the shipped loot file and checks that chests resolved from it
//! are well formed and reproducible.

use strata_core::CHEST_CAPACITY;
use strata_loot::{LootError, LootRegistry, LootResolver};
use strata_procedural::WorldSeed;

const STANDARD: &str = include_str!("../../../data/loot/standard.toml");

/// Test: The shipped tables load and validate.
#[test]
fn test_standard_tables_load() {
    let registry = LootRegistry::from_toml_str(STANDARD).unwrap();
    assert!(registry.chests.contains_key("surface"));
    assert!(registry.chests.contains_key("cavern"));
    assert!(registry.find_cycle().is_none());
}

/// Test: Resolved chests never exceed capacity and only hold known items.
#[test]
fn test_resolved_chests_are_bounded() {
    let registry = LootRegistry::from_toml_str(STANDARD).unwrap();
    let resolver = LootResolver::new(&registry);
    let known: Vec<i32> = registry.items.values().map(|i| i.id).collect();
    let mut rng = WorldSeed::new(42).rng();

    for _ in 0..500 {
        for template in ["surface", "cavern"] {
            let items = resolver
                .resolve_chest(template, CHEST_CAPACITY, &mut rng)
                .unwrap();
            assert!(items.len() <= CHEST_CAPACITY);
            for item in &items {
                assert!(known.contains(&item.item_id));
                assert!(item.stack >= 1);
            }
        }
    }
}

/// Test: Small capacities are honored.
#[test]
fn test_capacity_is_honored() {
    let registry = LootRegistry::from_toml_str(STANDARD).unwrap();
    let resolver = LootResolver::new(&registry);
    let mut rng = WorldSeed::new(7).rng();

    for capacity in 0..5 {
        let items = resolver.resolve_chest("cavern", capacity, &mut rng).unwrap();
        assert!(items.len() <= capacity);
    }
}

/// Test: Same seed, same contents.
#[test]
fn test_resolution_is_deterministic() {
    let registry = LootRegistry::from_toml_str(STANDARD).unwrap();
    let resolver = LootResolver::new(&registry);

    let run = |seed: u64| {
        let mut rng = WorldSeed::new(seed).rng();
        (0..50)
            .map(|_| resolver.resolve_chest("cavern", CHEST_CAPACITY, &mut rng).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(11), run(11));
}

/// Test: A cyclic file is rejected at load.
#[test]
fn test_cyclic_file_rejected() {
    let source = r#"
        [slots.a]
        entries = [{ target = { slot = "b" } }]

        [slots.b]
        entries = [{ target = { slot = "a" } }]
    "#;
    let err = LootRegistry::from_toml_str(source).unwrap_err();
    assert_eq!(
        err,
        LootError::CycleDetected(vec!["a".into(), "b".into(), "a".into()])
    );
}
