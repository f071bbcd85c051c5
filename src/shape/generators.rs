//! Triangle soups of simple shapes, used by tests, benchmarks and demos.

use crate::math::{Point, Real, Vector};
use crate::shape::Triangle;
use na::RealField;

/// The two triangles of the parallelogram spanned by `e1` and `e2` at `origin`.
pub fn parallelogram(origin: Point<Real>, e1: Vector<Real>, e2: Vector<Real>) -> [Triangle; 2] {
    let p1 = origin + e1;
    let p2 = origin + e1 + e2;
    let p3 = origin + e2;
    [
        Triangle::new(origin, p1, p2),
        Triangle::new(origin, p2, p3),
    ]
}

/// The 12 triangles of the axis-aligned box with corners `mins` and `maxs`.
pub fn cuboid(mins: Point<Real>, maxs: Point<Real>) -> Vec<Triangle> {
    let d = maxs - mins;
    let (dx, dy, dz) = (Vector::x() * d.x, Vector::y() * d.y, Vector::z() * d.z);

    let faces = [
        (mins, dy, dx),
        (mins + dz, dx, dy),
        (mins, dx, dz),
        (mins + dy, dz, dx),
        (mins, dz, dy),
        (mins + dx, dy, dz),
    ];

    faces
        .iter()
        .flat_map(|(o, e1, e2)| parallelogram(*o, *e1, *e2))
        .collect()
}

/// The 12 triangles of the unit cube `[0, 1]³`.
pub fn unit_cube() -> Vec<Triangle> {
    cuboid(Point::origin(), Point::new(1.0, 1.0, 1.0))
}

/// A UV-sphere made of `nphi_subdiv` bands of `ntheta_subdiv` quads each.
///
/// The quads touching the poles collapse into single triangles, so the
/// result contains no degenerate triangle.
pub fn sphere(
    center: Point<Real>,
    radius: Real,
    ntheta_subdiv: u32,
    nphi_subdiv: u32,
) -> Vec<Triangle> {
    assert!(ntheta_subdiv >= 3 && nphi_subdiv >= 2);

    let dtheta = Real::two_pi() / ntheta_subdiv as Real;
    let dphi = Real::pi() / nphi_subdiv as Real;

    let vertex = |band: u32, slice: u32| {
        let phi = -Real::frac_pi_2() + dphi * band as Real;
        let theta = dtheta * (slice % ntheta_subdiv) as Real;
        center
            + Vector::new(
                phi.cos() * theta.cos(),
                phi.sin(),
                phi.cos() * theta.sin(),
            ) * radius
    };

    let mut triangles = Vec::new();

    for band in 0..nphi_subdiv {
        for slice in 0..ntheta_subdiv {
            let a = vertex(band, slice);
            let b = vertex(band, slice + 1);
            let c = vertex(band + 1, slice + 1);
            let d = vertex(band + 1, slice);

            if band != 0 {
                triangles.push(Triangle::new(a, b, c));
            }
            if band != nphi_subdiv - 1 {
                triangles.push(Triangle::new(a, c, d));
            }
        }
    }

    triangles
}

#[cfg(test)]
mod test {
    use crate::bounding_volume::Box3;
    use crate::math::Point;

    #[test]
    fn unit_cube_is_closed_and_tight() {
        let cube = super::unit_cube();
        assert_eq!(cube.len(), 12);

        let bounds = cube
            .iter()
            .fold(Box3::EMPTY, |acc, tri| acc | tri.bounds());
        assert_eq!(bounds.mins(), Point::origin());
        assert_eq!(bounds.maxs(), Point::new(1.0, 1.0, 1.0));
        assert_relative_eq!(
            cube.iter()
                .map(|t| (t.p2 - t.p1).cross(&(t.p3 - t.p1)).norm() * 0.5)
                .sum::<f32>(),
            6.0
        );
    }

    #[test]
    fn sphere_triangle_count() {
        let sphere = super::sphere(Point::origin(), 2.0, 8, 4);
        assert_eq!(sphere.len(), 8 * 4 * 2 - 2 * 8);
    }
}
