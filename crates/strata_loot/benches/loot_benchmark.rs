//! Benchmark for chest resolution.
//!
//! TARGET: 100,000 chests per second
//!
//! Run with: cargo bench --package strata_loot --bench loot_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_loot::{
    ChestTemplate, ItemDef, ItemSlot, LootRegistry, LootResolver, SlotEntry, SlotRef,
};
use strata_procedural::WorldSeed;

fn create_registry() -> LootRegistry {
    let mut registry = LootRegistry::new();
    for i in 0..16 {
        registry.add_item(
            format!("item_{i}"),
            ItemDef::new(100 + i).with_stack(1, 20).with_probability(f64::from(i + 1)),
        );
    }
    registry.add_slot(
        "common",
        ItemSlot::new((0..16).map(|i| SlotEntry::item(format!("item_{i}"))).collect()),
    );
    registry.add_slot(
        "nested",
        ItemSlot::new(vec![
            SlotEntry::item("item_0"),
            SlotEntry::slot("common").times(1, 3).weighted(2.0),
        ]),
    );
    registry.add_chest(
        "bench",
        ChestTemplate::new(21)
            .with_slot(SlotRef::new("common").times(2, 5))
            .with_slot(SlotRef::new("nested").with_probability(0.7).times(1, 4)),
    );
    registry
}

fn benchmark_resolve(c: &mut Criterion) {
    let registry = create_registry();
    if registry.validate().is_err() {
        return;
    }
    let resolver = LootResolver::new(&registry);
    let mut rng = WorldSeed::new(42).rng();

    let mut group = c.benchmark_group("loot_resolution");
    group.throughput(Throughput::Elements(1));
    group.bench_function("resolve_chest", |b| {
        b.iter(|| black_box(resolver.resolve_chest("bench", 40, &mut rng).ok()));
    });
    group.finish();
}

fn benchmark_validate(c: &mut Criterion) {
    let registry = create_registry();

    c.bench_function("validate_registry", |b| {
        b.iter(|| black_box(registry.validate().is_ok()));
    });
}

criterion_group!(benches, benchmark_resolve, benchmark_validate);
criterion_main!(benches);
