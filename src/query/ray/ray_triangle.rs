use crate::math::{Point, Real, Vector};
use crate::query::{Ray, Segment};
use crate::shape::Triangle;

impl Triangle {
    /// Computes the parameter `t` at which the line `origin + dir * t`
    /// crosses this triangle.
    ///
    /// The line passes through the triangle iff the three signed volumes
    /// spanned by `dir` and the edges seen from `origin` do not disagree in
    /// sign. Returns `None` if the line misses the triangle or is parallel to
    /// its plane. The returned parameter may be negative.
    pub fn intersect_line(&self, origin: &Point<Real>, dir: &Vector<Real>) -> Option<Real> {
        let e1 = self.p1 - origin;
        let e2 = self.p2 - origin;
        let e3 = self.p3 - origin;

        let v1 = e1.cross(&e2).dot(dir);
        let v2 = e2.cross(&e3).dot(dir);
        let v3 = e3.cross(&e1).dot(dir);

        if v1 * v2 < 0.0 || v2 * v3 < 0.0 || v3 * v1 < 0.0 {
            return None;
        }

        let normal = (self.p1 - self.p3).cross(&(self.p2 - self.p3));
        let t = e1.dot(&normal) / dir.dot(&normal);

        if t.is_finite() {
            Some(t)
        } else {
            None
        }
    }

    /// The parameter of the intersection of `ray` with this triangle, if it is
    /// in front of the ray origin.
    #[inline]
    pub fn intersect_ray(&self, ray: &Ray) -> Option<Real> {
        self.intersect_line(&ray.origin, &ray.dir)
            .filter(|t| *t >= 0.0)
    }

    /// Does the open segment `]0, 1[` cross this triangle?
    ///
    /// Segment endpoints lying on the triangle do not count as intersections:
    /// a shadow ray is allowed to start or end on a surface.
    #[inline]
    pub fn intersects_segment(&self, segment: &Segment) -> bool {
        self.intersect_line(&segment.origin, &segment.difference)
            .is_some_and(|t| t > 0.0 && t < 1.0)
    }
}
