//! Rays and segments.

use crate::math::{Point, Real, Vector};

/// A ray for ray-casting queries.
///
/// Points along the ray are `origin + dir * t` for `t ≥ 0`. The direction
/// does not need to be normalized: every parameter reported by this crate is
/// expressed in units of `dir`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Ray {
    /// Starting point of the ray.
    pub origin: Point<Real>,
    /// Direction of the ray.
    pub dir: Vector<Real>,
}

impl Ray {
    /// Creates a new ray starting from `origin` and with the direction `dir`.
    pub fn new(origin: Point<Real>, dir: Vector<Real>) -> Ray {
        Ray { origin, dir }
    }

    /// Computes the point at the given parameter on this ray.
    #[inline]
    pub fn point_at(&self, t: Real) -> Point<Real> {
        self.origin + self.dir * t
    }
}

/// A finite segment from `origin` to `origin + difference`.
///
/// Shadow rays and the ray samples that are known to hit something are
/// segments: their parameter range is `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Segment {
    /// Start point of the segment.
    pub origin: Point<Real>,
    /// Vector from the start point to the end point.
    pub difference: Vector<Real>,
}

impl Segment {
    /// Creates a new segment.
    pub fn new(origin: Point<Real>, difference: Vector<Real>) -> Segment {
        Segment { origin, difference }
    }

    /// Creates the segment joining `a` to `b`.
    pub fn from_endpoints(a: Point<Real>, b: Point<Real>) -> Segment {
        Segment::new(a, b - a)
    }

    /// The end point of this segment.
    #[inline]
    pub fn end(&self) -> Point<Real> {
        self.origin + self.difference
    }

    /// Computes the point at the given parameter on this segment.
    #[inline]
    pub fn point_at(&self, t: Real) -> Point<Real> {
        self.origin + self.difference * t
    }

    /// The ray supporting this segment.
    #[inline]
    pub fn as_ray(&self) -> Ray {
        Ray::new(self.origin, self.difference)
    }
}
