use crate::common::{generate_shadow_queries, generate_soup};
use rand::SeedableRng;
use rand_isaac::IsaacRng;
use rbvh::cost::{apply_rtsah_ordering, CostHistogram, FullCostMeasure, WideCostMeasure};
use rbvh::partitioning::bvh::{
    self, BoundsCountAggregator, BuildConfig, BuildTriangles, Bvh, BvhNodeFactory, SahEvaluator,
};
use rbvh::query::Segment;
use test::Bencher;

fn ordered_tree(rng: &mut IsaacRng) -> Bvh {
    let tree = bvh::build(
        &mut BuildTriangles::new(generate_soup(rng, 5_000)),
        &mut SahEvaluator::default(),
        &BvhNodeFactory::default(),
        &BoundsCountAggregator,
        &BuildConfig::default(),
    )
    .unwrap();
    apply_rtsah_ordering(&tree)
}

#[bench]
fn bench_full_cost_measure(bh: &mut Bencher) {
    let mut rng = IsaacRng::seed_from_u64(0);
    let tree = ordered_tree(&mut rng);
    let queries = generate_shadow_queries(&mut rng, 1_000);

    bh.iter(|| test::black_box(FullCostMeasure::total_cost(&tree, &queries)))
}

#[bench]
fn bench_wide_cost_measure(bh: &mut Bencher) {
    let mut rng = IsaacRng::seed_from_u64(0);
    let tree = ordered_tree(&mut rng);
    let segments: Vec<Segment> = generate_shadow_queries(&mut rng, 1_000)
        .into_iter()
        .map(|q| q.segment)
        .collect();
    let measure = WideCostMeasure::new(64);

    bh.iter(|| test::black_box(measure.total_cost(&tree, &segments)))
}

#[bench]
fn bench_cost_histogram(bh: &mut Bencher) {
    let mut rng = IsaacRng::seed_from_u64(0);
    let tree = ordered_tree(&mut rng);
    let queries = generate_shadow_queries(&mut rng, 1_000);

    bh.iter(|| test::black_box(CostHistogram::measure(&tree, &queries)))
}

#[bench]
fn bench_rtsah_ordering(bh: &mut Bencher) {
    let mut rng = IsaacRng::seed_from_u64(0);
    let tree = ordered_tree(&mut rng);

    bh.iter(|| test::black_box(apply_rtsah_ordering(&tree)))
}
