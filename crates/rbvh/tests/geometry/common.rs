use rbvh::math::{Point, Real, Vector};
use rbvh::partitioning::bvh::{self, BoundsCountAggregator, BuildConfig, BuildTriangles};
use rbvh::partitioning::bvh::{Bvh, BvhNodeFactory, SahEvaluator};
use rbvh::query::{Ray, Segment, ShadowQuery};
use rbvh::shape::Triangle;

pub fn random_vector(rng: &mut oorandom::Rand32, scale: Real) -> Vector<Real> {
    Vector::new(rng.rand_float(), rng.rand_float(), rng.rand_float()) * scale
}

pub fn random_soup(len: usize, seed: u64) -> Vec<Triangle> {
    let mut rng = oorandom::Rand32::new(seed);

    (0..len)
        .map(|_| {
            let base = Point::origin() + random_vector(&mut rng, 10.0);
            Triangle::new(
                base,
                base + random_vector(&mut rng, 1.0),
                base + random_vector(&mut rng, 1.0),
            )
        })
        .collect()
}

pub fn sah_build(triangles: Vec<Triangle>) -> Bvh {
    let mut tris = BuildTriangles::new(triangles);
    bvh::build(
        &mut tris,
        &mut SahEvaluator::default(),
        &BvhNodeFactory::default(),
        &BoundsCountAggregator,
        &BuildConfig::default(),
    )
    .unwrap()
}

/// Rays starting around the `[-2, 12]^3` cube and aimed at its inside.
pub fn random_rays(len: usize, seed: u64) -> Vec<Ray> {
    let mut rng = oorandom::Rand32::new(seed);

    (0..len)
        .map(|_| {
            let origin = Point::new(-2.0, -2.0, -2.0) + random_vector(&mut rng, 14.0);
            let target = Point::origin() + random_vector(&mut rng, 10.0);
            Ray::new(origin, target - origin)
        })
        .collect()
}

pub fn random_shadow_queries(len: usize, seed: u64) -> Vec<ShadowQuery> {
    let mut rng = oorandom::Rand32::new(seed);

    (0..len)
        .map(|_| {
            let a = Point::new(-2.0, -2.0, -2.0) + random_vector(&mut rng, 14.0);
            let b = Point::new(-2.0, -2.0, -2.0) + random_vector(&mut rng, 14.0);
            ShadowQuery {
                segment: Segment::from_endpoints(a, b),
                connected: rng.rand_float() < 0.5,
            }
        })
        .collect()
}
