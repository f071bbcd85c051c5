use approx::assert_relative_eq;
use crate::common::{random_rays, random_shadow_queries, random_soup, sah_build};
use rbvh::cost::{FullCostMeasure, KernelFlags};
use rbvh::partitioning::bvh::{
    self, BlendedEvaluator, BoundsCountAggregator, BuildConfig, BuildTriangles, Bvh,
    BvhNodeFactory, FirstHitTraversal, RayCostEvaluator, RayOrder, SrdhConfig, SrdhEvaluator,
    DEFAULT_ALPHA, DEFAULT_BLEND_WEIGHT,
};
use rbvh::query::{RayCompiler, RayKind, RayQuery, RaySet, ShadowRayCompiler};
use rbvh::shape::Triangle;

fn assert_same_hits(reference: &Bvh, tree: &Bvh, seed: u64) {
    for ray in random_rays(300, seed) {
        match (RayOrder.first_hit(reference, &ray), RayOrder.first_hit(tree, &ray)) {
            (Some(a), Some(b)) => assert_relative_eq!(a.t, b.t, epsilon = 1.0e-5),
            (None, None) => {}
            (a, b) => panic!("Ray {ray:?} disagrees: {a:?} vs. {b:?}"),
        }
    }
}

fn sorted_coords(tree: &Bvh) -> Vec<[f32; 9]> {
    let mut coords: Vec<_> = tree
        .leaves()
        .flat_map(|l| l.primitives.iter().map(Triangle::coords))
        .collect();
    coords.sort_by(|a, b| a.partial_cmp(b).unwrap());
    coords
}

fn recorded_casts(len: usize, seed: u64) -> RaySet {
    let queries = random_rays(len, seed)
        .into_iter()
        .map(|ray| RayQuery {
            // The recorded outcome is ignored by the compiler.
            kind: RayKind::CastMiss,
            depth: 0,
            origin: ray.origin,
            direction: ray.dir,
        })
        .collect();
    RaySet { queries }
}

#[test]
fn ray_cost_and_blended_builds_from_compiled_samples() {
    let soup = random_soup(300, 41);
    let reference = sah_build(soup.clone());
    let samples = RayCompiler::compile(&recorded_casts(2000, 42), &reference);
    assert!(!samples.hits.is_empty() && !samples.misses.is_empty());

    let mut evaluator = RayCostEvaluator::new(samples.clone(), DEFAULT_ALPHA);
    let ray_tree = bvh::build(
        &mut BuildTriangles::new(soup.clone()),
        &mut evaluator,
        &BvhNodeFactory::default(),
        &BoundsCountAggregator,
        &BuildConfig::default(),
    )
    .unwrap();
    ray_tree.assert_well_formed();
    assert_eq!(sorted_coords(&ray_tree), sorted_coords(&reference));
    assert_same_hits(&reference, &ray_tree, 43);

    let mut evaluator = BlendedEvaluator::new(samples, DEFAULT_ALPHA, DEFAULT_BLEND_WEIGHT);
    let blended_tree = bvh::build(
        &mut BuildTriangles::new(soup),
        &mut evaluator,
        &BvhNodeFactory::default(),
        &BoundsCountAggregator,
        &BuildConfig::default(),
    )
    .unwrap();
    blended_tree.assert_well_formed();
    assert_same_hits(&reference, &blended_tree, 44);
}

#[test]
fn srdh_builds_from_compiled_shadow_rays() {
    let reference = sah_build(random_soup(300, 51));
    let queries = random_shadow_queries(2000, 52);
    let compiled = ShadowRayCompiler::compile(&queries, &reference);
    assert!(!compiled.samples.broken.is_empty());
    assert!(!compiled.samples.connected.is_empty());

    let mut triangles = compiled.triangles;
    let mut evaluator = SrdhEvaluator::new(compiled.samples, SrdhConfig::default());
    let tree = bvh::build(
        &mut triangles,
        &mut evaluator,
        &BvhNodeFactory::default(),
        &BoundsCountAggregator,
        &BuildConfig::default(),
    )
    .unwrap();
    tree.assert_well_formed();
    assert_eq!(sorted_coords(&tree), sorted_coords(&reference));
    assert!(tree
        .branches()
        .all(|b| KernelFlags::SRDH.contains(b.content.kernel.flag())));

    // Both trees hold the same triangles, so they agree on occlusion.
    for query in &queries {
        assert_eq!(
            FullCostMeasure::trace(&reference, &query.segment).hits,
            FullCostMeasure::trace(&tree, &query.segment).hits
        );
    }
}

#[test]
fn srdh_restricted_to_fixed_kernels() {
    let reference = sah_build(random_soup(100, 61));
    let compiled = ShadowRayCompiler::compile(&random_shadow_queries(500, 62), &reference);

    let config = SrdhConfig {
        kernels: KernelFlags::FIXED,
        ..SrdhConfig::default()
    };
    let mut triangles = compiled.triangles;
    let tree = bvh::build(
        &mut triangles,
        &mut SrdhEvaluator::new(compiled.samples, config),
        &BvhNodeFactory::default(),
        &BoundsCountAggregator,
        &BuildConfig::default(),
    )
    .unwrap();
    assert!(tree.branches().all(|b| b.content.kernel.is_fixed()));
}
