//! Axis-aligned bounding box made of three closed intervals.

use crate::math::{Point, Real, Vector, DIM};
use crate::utils::ClosedInterval;
use core::ops::{BitAnd, BitOr};

/// An axis-aligned bounding box.
///
/// A `Box3` is the cartesian product of three [`ClosedInterval`]s. It is
/// empty as soon as one of its intervals is empty. The surface area is
/// computed at construction.
///
/// # Example
///
/// ```rust
/// use rbvh::bounding_volume::Box3;
/// use rbvh::math::Point;
///
/// let a = Box3::from_points([Point::new(0.0, 0.0, 0.0), Point::new(1.0, 2.0, 3.0)]);
/// assert_eq!(a.surface_area(), 2.0 * (2.0 + 6.0 + 3.0));
/// assert!(a.contains_point(&Point::new(0.5, 1.0, 1.5)));
/// assert!(Box3::EMPTY.is_empty());
/// assert_eq!(Box3::EMPTY.surface_area(), 0.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Box3 {
    axes: [ClosedInterval; DIM],
    // Negative for empty boxes.
    area: Real,
}

impl Default for Box3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Box3 {
    /// The empty box, identity of the union.
    pub const EMPTY: Self = Self {
        axes: [ClosedInterval::EMPTY; DIM],
        area: -1.0,
    };

    /// Creates a box from its three axis ranges.
    pub fn new(x: ClosedInterval, y: ClosedInterval, z: ClosedInterval) -> Self {
        let axes = [x, y, z];
        let area = if axes.iter().any(|r| r.is_empty()) {
            -1.0
        } else {
            let (sx, sy, sz) = (x.size(), y.size(), z.size());
            2.0 * (sx * sy + sy * sz + sz * sx)
        };
        Self { axes, area }
    }

    /// Creates a box from its minimum and maximum corners.
    pub fn from_corners(mins: Point<Real>, maxs: Point<Real>) -> Self {
        Self::new(
            ClosedInterval::new(mins.x, maxs.x),
            ClosedInterval::new(mins.y, maxs.y),
            ClosedInterval::new(mins.z, maxs.z),
        )
    }

    /// The smallest box containing all the given points.
    ///
    /// Returns [`Box3::EMPTY`] if the iterator is empty.
    pub fn from_points<I>(pts: I) -> Self
    where
        I: IntoIterator<Item = Point<Real>>,
    {
        let mut axes = [ClosedInterval::EMPTY; DIM];
        for pt in pts {
            for (axis, range) in axes.iter_mut().enumerate() {
                *range = range.extended(pt[axis]);
            }
        }
        Self::new(axes[0], axes[1], axes[2])
    }

    /// The range of this box along `axis`.
    #[inline]
    pub fn axis(&self, axis: usize) -> ClosedInterval {
        self.axes[axis]
    }

    /// The range of this box along the `x` axis.
    #[inline]
    pub fn x(&self) -> ClosedInterval {
        self.axes[0]
    }

    /// The range of this box along the `y` axis.
    #[inline]
    pub fn y(&self) -> ClosedInterval {
        self.axes[1]
    }

    /// The range of this box along the `z` axis.
    #[inline]
    pub fn z(&self) -> ClosedInterval {
        self.axes[2]
    }

    /// The corner with the smallest coordinates.
    #[inline]
    pub fn mins(&self) -> Point<Real> {
        Point::new(self.axes[0].min, self.axes[1].min, self.axes[2].min)
    }

    /// The corner with the largest coordinates.
    #[inline]
    pub fn maxs(&self) -> Point<Real> {
        Point::new(self.axes[0].max, self.axes[1].max, self.axes[2].max)
    }

    /// The size of this box along each axis, zero for empty ranges.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        Vector::new(self.axes[0].size(), self.axes[1].size(), self.axes[2].size())
    }

    /// The center of this box.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        Point::new(
            self.axes[0].center(),
            self.axes[1].center(),
            self.axes[2].center(),
        )
    }

    /// Is this box empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.area < 0.0
    }

    /// The surface area of this box, zero if it is empty.
    #[inline]
    pub fn surface_area(&self) -> Real {
        self.area.max(0.0)
    }

    /// The smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            *other
        } else if other.is_empty() {
            *self
        } else {
            Self::new(
                self.axes[0] | other.axes[0],
                self.axes[1] | other.axes[1],
                self.axes[2] | other.axes[2],
            )
        }
    }

    /// The smallest box containing both `self` and `pt`.
    pub fn extended(&self, pt: &Point<Real>) -> Self {
        Self::new(
            self.axes[0] | pt.x,
            self.axes[1] | pt.y,
            self.axes[2] | pt.z,
        )
    }

    /// The intersection of `self` and `other`.
    pub fn intersection(&self, other: &Self) -> Self {
        Self::new(
            self.axes[0] & other.axes[0],
            self.axes[1] & other.axes[1],
            self.axes[2] & other.axes[2],
        )
    }

    /// Is `other` entirely inside `self`?
    ///
    /// The empty box is contained in every box.
    pub fn contains_box(&self, other: &Self) -> bool {
        other.is_empty()
            || self
                .axes
                .iter()
                .zip(other.axes.iter())
                .all(|(outer, inner)| outer.contains_interval(inner))
    }

    /// Is `pt` inside this box (boundary included)?
    pub fn contains_point(&self, pt: &Point<Real>) -> bool {
        self.axes
            .iter()
            .enumerate()
            .all(|(axis, range)| range.contains(pt[axis]))
    }
}

impl BitOr for Box3 {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.union(&rhs)
    }
}

impl BitAnd for Box3 {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        self.intersection(&rhs)
    }
}
