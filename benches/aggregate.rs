use criterion::{criterion_group, criterion_main, Criterion};
use blockplan::prelude::*;

fn make_metadata(blocks: usize) -> Vec<BlockMetadata> {
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
    ]);
    (0..blocks)
        .map(|i| BlockMetadata::with_counts(1_000 + i as u64, 64_000).schema(schema.clone()))
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let blocks = 10_000;
    let metadata = make_metadata(blocks);
    let refs: Vec<BlockRef> = (0..blocks).map(|_| BlockRef::new()).collect();

    c.bench_function("bound_aggregate_cold_10k", |b| {
        b.iter(|| {
            let op = BoundInputOperator::new(FromKind::Blocks, refs.clone(), metadata.clone())
                .expect("construct");
            op.aggregate_output_metadata()
        })
    });

    let op = BoundInputOperator::new(FromKind::Blocks, refs.clone(), metadata.clone())
        .expect("construct");
    op.aggregate_output_metadata();
    c.bench_function("bound_aggregate_cached_10k", |b| {
        b.iter(|| op.aggregate_output_metadata())
    });

    let bundles = op.input_data().to_vec();
    let deferred = DeferredInputOperator::new_with_data(bundles.clone());
    c.bench_function("deferred_update_then_aggregate_10k", |b| {
        b.iter(|| {
            deferred.update_data(Some(bundles.clone()));
            deferred.aggregate_output_metadata()
        })
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
