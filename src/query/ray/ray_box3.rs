use crate::bounding_volume::Box3;
use crate::math::{Point, Real, Vector, DIM};
use crate::query::{Ray, Segment};
use crate::utils::ClosedInterval;

impl Box3 {
    /// Clips the parameter range `initial` of the line `origin + dir * t`
    /// against this box.
    ///
    /// Each axis contributes the slab `(range - origin) / dir`. An axis with a
    /// zero direction component leaves the range untouched if the origin lies
    /// within the slab and empties it otherwise. The result is empty as soon
    /// as one axis empties it.
    pub fn intersect_interval(
        &self,
        origin: &Point<Real>,
        dir: &Vector<Real>,
        initial: ClosedInterval,
    ) -> ClosedInterval {
        let mut range = initial;

        for axis in 0..DIM {
            let slab = (self.axis(axis) - origin[axis]) / dir[axis];
            range = range & slab;

            if range.is_empty() {
                return ClosedInterval::EMPTY;
            }
        }

        range
    }

    /// The parameter range of `ray` inside this box.
    #[inline]
    pub fn intersect_ray(&self, ray: &Ray) -> ClosedInterval {
        self.intersect_interval(&ray.origin, &ray.dir, ClosedInterval::POSITIVES)
    }

    /// The parameter range of `segment` inside this box.
    #[inline]
    pub fn intersect_segment(&self, segment: &Segment) -> ClosedInterval {
        self.intersect_interval(&segment.origin, &segment.difference, ClosedInterval::UNIT)
    }

    /// The parameter range of the infinite line supporting `ray` inside this box.
    #[inline]
    pub fn intersect_line(&self, ray: &Ray) -> ClosedInterval {
        self.intersect_interval(&ray.origin, &ray.dir, ClosedInterval::ALL)
    }

    /// Does `ray` intersect this box?
    #[inline]
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        !self.intersect_ray(ray).is_empty()
    }

    /// Does `segment` intersect this box?
    #[inline]
    pub fn intersects_segment(&self, segment: &Segment) -> bool {
        !self.intersect_segment(segment).is_empty()
    }

    /// Does the line supporting `ray` intersect this box?
    #[inline]
    pub fn intersects_line(&self, ray: &Ray) -> bool {
        !self.intersect_line(ray).is_empty()
    }
}

#[cfg(test)]
mod test {
    use crate::bounding_volume::Box3;
    use crate::math::{Point, Vector};
    use crate::query::{Ray, Segment};
    use crate::utils::ClosedInterval;

    fn unit_box() -> Box3 {
        Box3::from_corners(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn axis_parallel_rays_use_the_slab_rule() {
        let b = unit_box();
        let inside = Ray::new(Point::new(-1.0, 0.5, 0.5), Vector::x());
        let outside = Ray::new(Point::new(-1.0, 2.0, 0.5), Vector::x());

        assert_eq!(b.intersect_ray(&inside), ClosedInterval::new(1.0, 2.0));
        assert!(!b.intersects_ray(&outside));
    }

    #[test]
    fn rays_start_at_zero_and_lines_do_not() {
        let b = unit_box();
        let ray = Ray::new(Point::new(0.5, 0.5, 0.5), Vector::new(0.0, 0.0, 2.0));
        assert_eq!(b.intersect_ray(&ray), ClosedInterval::new(0.0, 0.25));
        assert_eq!(b.intersect_line(&ray), ClosedInterval::new(-0.25, 0.25));

        let behind = Ray::new(Point::new(0.5, 0.5, 2.0), Vector::z());
        assert!(!b.intersects_ray(&behind));
        assert!(b.intersects_line(&behind));
    }

    #[test]
    fn segments_stop_at_one() {
        let b = unit_box();
        let short = Segment::from_endpoints(Point::new(-2.0, 0.5, 0.5), Point::new(-1.0, 0.5, 0.5));
        let long = Segment::from_endpoints(Point::new(-2.0, 0.5, 0.5), Point::new(2.0, 0.5, 0.5));

        assert!(!b.intersects_segment(&short));
        assert_eq!(b.intersect_segment(&long), ClosedInterval::new(0.5, 0.75));
    }
}
