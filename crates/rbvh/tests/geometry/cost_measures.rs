use crate::common::{random_shadow_queries, random_soup, sah_build};
use approx::assert_relative_eq;
use rbvh::cost::{
    CostHistogram, FullCostMeasure, OracleCost, TraversalKernel, WideCostMeasure,
};
use rbvh::partitioning::bvh::{Bvh, BvhBranch};
use rbvh::query::{Segment, ShadowQuery};

fn with_kernels(tree: &Bvh, kernels: &[TraversalKernel]) -> Bvh {
    tree.map(
        |b| BvhBranch {
            kernel: kernels[b.id % kernels.len()],
            ..*b
        },
        |l| l.clone(),
    )
}

/// Queries whose recorded connectivity is the actual one.
fn faithful_queries(tree: &Bvh, len: usize, seed: u64) -> Vec<ShadowQuery> {
    random_shadow_queries(len, seed)
        .into_iter()
        .map(|q| ShadowQuery {
            connected: !tree
                .leaves()
                .flat_map(|l| l.primitives.iter())
                .any(|t| t.intersects_segment(&q.segment)),
            ..q
        })
        .collect()
}

#[test]
fn histogram_matches_deterministic_expectations() {
    let tree = with_kernels(
        &sah_build(random_soup(300, 11)),
        &[
            TraversalKernel::LeftFirst,
            TraversalKernel::FrontToBack,
            TraversalKernel::RightFirst,
            TraversalKernel::BackToFront,
        ],
    );
    let queries = random_shadow_queries(500, 5);

    let histogram = CostHistogram::measure(&tree, &queries);
    assert_eq!(histogram.num_rays(), queries.len());
    assert_eq!(histogram.out_of_range_both, 0);

    let mut expected_tests = 0.0;
    let mut expected_hits = 0;
    for query in &queries {
        let traced = FullCostMeasure::trace(&tree, &query.segment);
        assert_eq!(traced.cost.bbox_tests.variance, 0.0);
        expected_tests += traced.cost.bbox_tests.expected;
        expected_hits += traced.hits as usize;
    }

    let measured_tests: usize = histogram.both.iter().enumerate().map(|(k, n)| k * n).sum();
    assert_eq!(measured_tests as f64, expected_tests);
    assert_eq!(histogram.hits.iter().sum::<usize>(), expected_hits);
}

#[test]
fn spine_and_side_split_the_full_cost() {
    let tree = with_kernels(
        &sah_build(random_soup(200, 12)),
        &[TraversalKernel::UniformRandom, TraversalKernel::LeftFirst],
    );

    for query in random_shadow_queries(300, 6) {
        let full = FullCostMeasure::trace(&tree, &query.segment);
        let split = FullCostMeasure::trace_spine(&tree, &query.segment);

        assert_eq!(full.hits, split.hits);
        assert_relative_eq!(
            full.cost.bbox_tests.expected,
            split.total().bbox_tests.expected,
            epsilon = 1.0e-9
        );
        assert_relative_eq!(
            full.cost.primitive_tests.expected,
            split.total().primitive_tests.expected,
            epsilon = 1.0e-9
        );
    }
}

#[test]
fn oracle_never_does_more_box_tests() {
    let tree = with_kernels(
        &sah_build(random_soup(200, 13)),
        &[TraversalKernel::UniformRandom, TraversalKernel::FrontToBack],
    );

    for query in random_shadow_queries(300, 8) {
        let full = FullCostMeasure::trace(&tree, &query.segment);
        let oracle = OracleCost::trace(&tree, &query.segment);

        assert_eq!(full.hits, oracle.hits);
        assert!(oracle.cost.bbox_tests.expected <= full.cost.bbox_tests.expected + 1.0e-9);
        if !full.hits {
            assert_eq!(oracle.cost, full.cost);
        }
    }
}

#[test]
fn totals_over_faithful_queries() {
    let tree = sah_build(random_soup(200, 14));
    let queries = faithful_queries(&tree, 400, 9);
    let num_occluded = queries.iter().filter(|q| !q.connected).count();

    let total = FullCostMeasure::total_cost(&tree, &queries);
    assert_eq!(total.num_rays, queries.len());
    assert_eq!(total.num_hits, num_occluded);
    assert_eq!(total.disagreements, 0);
    assert_relative_eq!(
        total.cost.bbox_tests.expected,
        (total.spine + total.side + total.non_hit).bbox_tests.expected,
        epsilon = 1.0e-6
    );

    let segments: Vec<Segment> = queries.iter().map(|q| q.segment).collect();
    let oracle = OracleCost::total_cost(&tree, &segments);
    assert_eq!(oracle.num_hits, num_occluded);
    assert_relative_eq!(
        oracle.hit.bbox_tests.expected,
        total.spine_oracle.bbox_tests.expected,
        epsilon = 1.0e-6
    );

    let wide = WideCostMeasure::new(64);
    let wide_total = wide.total_cost(&tree, &segments);
    assert_relative_eq!(
        wide_total.bbox_tests.expected,
        total.cost.bbox_tests.expected,
        epsilon = 1.0e-6
    );
    assert_eq!(wide.num_buffers_in_use(), 0);
}
