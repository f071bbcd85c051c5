//! Definition of the triangle shape.

use crate::bounding_volume::Box3;
use crate::math::{Point, Real};

/// A triangle shape.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Triangle {
    /// The triangle first point.
    pub p1: Point<Real>,
    /// The triangle second point.
    pub p2: Point<Real>,
    /// The triangle third point.
    pub p3: Point<Real>,
}

impl Triangle {
    /// Creates a triangle from three points.
    #[inline]
    pub fn new(p1: Point<Real>, p2: Point<Real>, p3: Point<Real>) -> Triangle {
        Triangle { p1, p2, p3 }
    }

    /// The vertices of this triangle.
    #[inline]
    pub fn vertices(&self) -> [Point<Real>; 3] {
        [self.p1, self.p2, self.p3]
    }

    /// The 9 coordinates of this triangle, vertex after vertex.
    pub fn coords(&self) -> [Real; 9] {
        [
            self.p1.x, self.p1.y, self.p1.z, self.p2.x, self.p2.y, self.p2.z, self.p3.x,
            self.p3.y, self.p3.z,
        ]
    }

    /// Builds a triangle from 9 coordinates laid out as [`Triangle::coords`].
    pub fn from_coords(c: &[Real; 9]) -> Triangle {
        Triangle::new(
            Point::new(c[0], c[1], c[2]),
            Point::new(c[3], c[4], c[5]),
            Point::new(c[6], c[7], c[8]),
        )
    }

    /// The bounding box of this triangle.
    #[inline]
    pub fn bounds(&self) -> Box3 {
        Box3::from_points(self.vertices())
    }

    /// The barycenter of this triangle.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        Point::from((self.p1.coords + self.p2.coords + self.p3.coords) / 3.0)
    }
}
