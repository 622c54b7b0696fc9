//! Benchmarks for filtered-index build and mutation.
//!
//! Run with: cargo bench -p lkit-model --bench index_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use lkit_core::{Address, ItemFilter, ItemId, ItemKind, ListingItem};
use lkit_model::{FilteredIndex, IndexEntry};

fn make_items(count: u32) -> Vec<ListingItem> {
    (0..count)
        .map(|i| ListingItem {
            id: ItemId::from_raw(i),
            address: Address(u64::from(i) * 4),
            kind: if i % 3 == 0 {
                ItemKind::Symbol
            } else {
                ItemKind::Instruction
            },
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index/build");

    for count in [1_000u32, 10_000, 100_000] {
        let items = make_items(count);
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::new("all", count), &items, |b, items| {
            b.iter(|| black_box(FilteredIndex::build(items, ItemFilter::All)))
        });
        group.bench_with_input(BenchmarkId::new("symbols", count), &items, |b, items| {
            b.iter(|| {
                black_box(FilteredIndex::build(
                    items,
                    ItemFilter::Only(ItemKind::Symbol),
                ))
            })
        });
    }

    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("index/churn");

    for count in [1_000u32, 10_000] {
        let items = make_items(count);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("insert_remove_middle", count),
            &items,
            |b, items| {
                let mut index = FilteredIndex::build(items, ItemFilter::All);
                let entry = IndexEntry {
                    // Odd address: lands between existing entries.
                    address: Address(u64::from(count) * 2 + 1),
                    item: ItemId::from_raw(u32::MAX),
                };
                b.iter(|| {
                    let row = index.insertion_position(entry.address);
                    index.insert(row, entry);
                    index.remove(row);
                })
            },
        );
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("index/lookup");

    for count in [1_000u32, 100_000] {
        let items = make_items(count);
        let index = FilteredIndex::build(&items, ItemFilter::All);
        let probe = IndexEntry::from(items[items.len() / 2]);
        group.bench_with_input(
            BenchmarkId::new("position_of", count),
            &probe,
            |b, probe| b.iter(|| black_box(index.position_of(*probe))),
        );
        group.bench_with_input(
            BenchmarkId::new("row_at_address", count),
            &probe,
            |b, probe| b.iter(|| black_box(index.row_at_address(probe.address))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_churn, bench_lookup);
criterion_main!(benches);
