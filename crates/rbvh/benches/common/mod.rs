use rand::Rng;
use rbvh::math::{Point, Real};
use rbvh::query::{Ray, Segment, ShadowQuery};
use rbvh::shape::Triangle;

fn random_point<R: Rng>(rng: &mut R, mins: Real, extent: Real) -> Point<Real> {
    Point::new(
        mins + rng.gen::<Real>() * extent,
        mins + rng.gen::<Real>() * extent,
        mins + rng.gen::<Real>() * extent,
    )
}

/// Small triangles scattered in the `[0, 10]^3` cube.
pub fn generate_soup<R: Rng>(rng: &mut R, len: usize) -> Vec<Triangle> {
    (0..len)
        .map(|_| {
            let base = random_point(rng, 0.0, 10.0);
            let e1 = random_point(rng, 0.0, 1.0).coords;
            let e2 = random_point(rng, 0.0, 1.0).coords;
            Triangle::new(base, base + e1, base + e2)
        })
        .collect()
}

/// Rays starting around the soup and aimed at its inside.
pub fn generate_rays<R: Rng>(rng: &mut R, len: usize) -> Vec<Ray> {
    (0..len)
        .map(|_| {
            let origin = random_point(rng, -2.0, 14.0);
            let target = random_point(rng, 0.0, 10.0);
            Ray::new(origin, target - origin)
        })
        .collect()
}

pub fn generate_shadow_queries<R: Rng>(rng: &mut R, len: usize) -> Vec<ShadowQuery> {
    (0..len)
        .map(|_| {
            let a = random_point(rng, -2.0, 14.0);
            let b = random_point(rng, -2.0, 14.0);
            ShadowQuery {
                segment: Segment::from_endpoints(a, b),
                connected: rng.gen(),
            }
        })
        .collect()
}
