use crate::common::{generate_rays, generate_soup};
use rand::SeedableRng;
use rand_isaac::IsaacRng;
use rbvh::partitioning::bvh::{
    self, BoundsCountAggregator, BuildConfig, BuildTriangles, Bvh, BvhNodeFactory,
    FirstHitTraversal, OrderedDepthFirst, RayOrder, SahEvaluator,
};
use test::Bencher;

const NUM_TRIANGLES: usize = 10_000;
const NUM_RAYS: usize = 1_000;

fn sah_build(tris: &mut BuildTriangles) -> Bvh {
    bvh::build(
        tris,
        &mut SahEvaluator::default(),
        &BvhNodeFactory::default(),
        &BoundsCountAggregator,
        &BuildConfig::default(),
    )
    .unwrap()
}

#[bench]
fn bench_sah_build(bh: &mut Bencher) {
    let mut rng = IsaacRng::seed_from_u64(0);
    let soup = generate_soup(&mut rng, NUM_TRIANGLES);

    bh.iter(|| {
        let mut tris = BuildTriangles::new(soup.iter().copied());
        test::black_box(sah_build(&mut tris))
    })
}

#[bench]
fn bench_first_hit_ordered_depth_first(bh: &mut Bencher) {
    let mut rng = IsaacRng::seed_from_u64(0);
    let tree = sah_build(&mut BuildTriangles::new(generate_soup(&mut rng, NUM_TRIANGLES)));
    let rays = generate_rays(&mut rng, NUM_RAYS);

    bh.iter(|| {
        for ray in &rays {
            let _ = test::black_box(OrderedDepthFirst.first_hit(&tree, ray));
        }
    })
}

#[bench]
fn bench_first_hit_ray_order(bh: &mut Bencher) {
    let mut rng = IsaacRng::seed_from_u64(0);
    let tree = sah_build(&mut BuildTriangles::new(generate_soup(&mut rng, NUM_TRIANGLES)));
    let rays = generate_rays(&mut rng, NUM_RAYS);

    bh.iter(|| {
        for ray in &rays {
            let _ = test::black_box(RayOrder.first_hit(&tree, ray));
        }
    })
}
