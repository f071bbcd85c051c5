use crate::common::{random_rays, random_soup, sah_build};
use approx::assert_relative_eq;
use rbvh::math::{Point, Vector};
use rbvh::partitioning::bvh::{
    FirstHitTraversal, HitRecord, OpCounter, OrderedDepthFirst, RayOrder,
};
use rbvh::query::Ray;
use rbvh::shape::generators;

/// Checks that both hits are the same record. Returns whether there was one.
fn assert_same_hit(ray: &Ray, a: Option<HitRecord>, b: Option<HitRecord>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            assert_eq!(a.triangle, b.triangle, "Ray {ray:?} hit different triangles");
            assert_eq!(a.leaf_id, b.leaf_id);
            assert_relative_eq!(a.t, b.t, epsilon = 1.0e-5);
            true
        }
        (None, None) => false,
        (a, b) => panic!("Ray {ray:?} disagrees: {a:?} vs. {b:?}"),
    }
}

#[test]
fn unit_cube_hits_agree() {
    let tree = sah_build(generators::unit_cube());
    let center = Point::new(0.5, 0.5, 0.5);
    let mut rng = oorandom::Rand32::new(11);
    let mut num_hits = 0;

    for _ in 0..1000 {
        // From a shell around the cube towards a point inside it.
        let offset = crate::common::random_vector(&mut rng, 2.0) - Vector::repeat(1.0);
        if offset.norm_squared() < 1.0e-4 {
            continue;
        }
        let origin = center + offset.normalize() * 3.0;
        let target = Point::origin() + crate::common::random_vector(&mut rng, 1.0);
        let ray = Ray::new(origin, target - origin);

        let a = OrderedDepthFirst.first_hit(&tree, &ray);
        let b = RayOrder.first_hit(&tree, &ray);
        if assert_same_hit(&ray, a, b) {
            num_hits += 1;
        }
    }

    // Every ray aims inside the cube.
    assert!(num_hits >= 990, "only {num_hits} hits");
}

#[test]
fn ordered_depth_first_and_ray_order_find_the_same_hits() {
    let tree = sah_build(random_soup(500, 7));
    let mut odf_ops = OpCounter::default();
    let mut ray_order_ops = OpCounter::default();
    let mut num_hits = 0;

    for ray in random_rays(1000, 42) {
        let a = OrderedDepthFirst.first_hit_with(&tree, &ray, &mut odf_ops);
        let b = RayOrder.first_hit_with(&tree, &ray, &mut ray_order_ops);

        if assert_same_hit(&ray, a, b) {
            num_hits += 1;
        }
    }

    assert!(num_hits > 0);
    assert_eq!(odf_ops.rays_cast, 1000);
    assert_eq!(odf_ops.hits_found, num_hits);
    assert_eq!(ray_order_ops.hits_found, num_hits);
}

#[test]
fn rays_from_inside_a_sphere_always_hit() {
    let tree = sah_build(generators::sphere(Point::origin(), 1.0, 16, 12));
    let mut rng = oorandom::Rand32::new(3);

    for _ in 0..1000 {
        let dir = crate::common::random_vector(&mut rng, 2.0) - Vector::repeat(1.0);
        if dir.norm_squared() < 1.0e-4 {
            continue;
        }

        let ray = Ray::new(Point::origin(), dir);
        let hit = RayOrder
            .first_hit(&tree, &ray)
            .unwrap_or_else(|| panic!("Ray {ray:?} escaped the sphere"));
        assert!(OrderedDepthFirst.first_hit(&tree, &ray).is_some());

        // The tessellation is inscribed in the unit sphere.
        let dist = (ray.point_at(hit.t) - Point::origin()).norm();
        assert!(dist <= 1.0 + 1.0e-4 && dist > 0.9, "hit at distance {dist}");
    }
}
