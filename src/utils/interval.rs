use crate::math::Real;
use core::ops::{Add, BitAnd, BitOr, Div, Mul, Sub};

/// A closed interval `[min, max]` of the real line.
///
/// An interval with `min > max` is empty. The canonical empty interval is
/// [`ClosedInterval::EMPTY`], i.e. `[+∞, -∞]`, which behaves as the identity of
/// the union and as the absorbing element of the intersection.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ClosedInterval {
    /// The lower bound of the interval.
    pub min: Real,
    /// The upper bound of the interval.
    pub max: Real,
}

impl ClosedInterval {
    /// The whole real line.
    pub const ALL: Self = Self::new(Real::NEG_INFINITY, Real::INFINITY);
    /// The empty interval.
    pub const EMPTY: Self = Self::new(Real::INFINITY, Real::NEG_INFINITY);
    /// The non-negative half-line `[0, +∞)`, the parameter range of a ray.
    pub const POSITIVES: Self = Self::new(0.0, Real::INFINITY);
    /// The unit interval `[0, 1]`, the parameter range of a segment.
    pub const UNIT: Self = Self::new(0.0, 1.0);

    /// Creates the interval `[min, max]`.
    #[inline]
    pub const fn new(min: Real, max: Real) -> Self {
        Self { min, max }
    }

    /// The degenerate interval `[value, value]`.
    #[inline]
    pub const fn point(value: Real) -> Self {
        Self::new(value, value)
    }

    /// Is this interval empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// The length of this interval, zero if it is empty or a single point.
    #[inline]
    pub fn size(&self) -> Real {
        if self.min >= self.max {
            0.0
        } else {
            self.max - self.min
        }
    }

    /// The midpoint of this interval.
    #[inline]
    pub fn center(&self) -> Real {
        (self.min + self.max) * 0.5
    }

    /// Does this interval contain `value`?
    #[inline]
    pub fn contains(&self, value: Real) -> bool {
        self.min <= value && value <= self.max
    }

    /// Does this interval contain all of `other`?
    ///
    /// The empty interval is contained in everything.
    #[inline]
    pub fn contains_interval(&self, other: &Self) -> bool {
        other.is_empty() || (self.min <= other.min && other.max <= self.max)
    }

    /// The intersection of two intervals.
    #[inline]
    pub fn intersection(&self, other: &Self) -> Self {
        Self::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// The smallest interval containing both `self` and `other`.
    ///
    /// Empty operands are ignored.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_empty() {
            *other
        } else if other.is_empty() {
            *self
        } else {
            Self::new(self.min.min(other.min), self.max.max(other.max))
        }
    }

    /// The smallest interval containing both `self` and `value`.
    #[inline]
    pub fn extended(&self, value: Real) -> Self {
        if self.is_empty() {
            Self::point(value)
        } else {
            Self::new(self.min.min(value), self.max.max(value))
        }
    }

    /// Is every point of `self` strictly smaller than every point of `other`?
    ///
    /// Vacuously true if either interval is empty.
    #[inline]
    pub fn entirely_less(&self, other: &Self) -> bool {
        self.is_empty() || other.is_empty() || self.max < other.min
    }

    /// Is every point of `self` strictly greater than every point of `other`?
    ///
    /// Vacuously true if either interval is empty.
    #[inline]
    pub fn entirely_greater(&self, other: &Self) -> bool {
        self.is_empty() || other.is_empty() || self.min > other.max
    }

    /// The half-line `[max, +∞)` lying above this interval.
    ///
    /// The empty interval has the whole line above it, and nothing lies above
    /// an interval unbounded to the right.
    pub fn greater_space(&self) -> Self {
        if self.is_empty() {
            Self::ALL
        } else if self.max == Real::INFINITY {
            Self::EMPTY
        } else {
            Self::new(self.max, Real::INFINITY)
        }
    }

    /// The half-line `(-∞, min]` lying below this interval.
    pub fn lesser_space(&self) -> Self {
        if self.is_empty() {
            Self::ALL
        } else if self.min == Real::NEG_INFINITY {
            Self::EMPTY
        } else {
            Self::new(Real::NEG_INFINITY, self.min)
        }
    }

    /// Maps `t ∈ [0, 1]` linearly onto this interval.
    #[inline]
    pub fn uniform_sample(&self, t: Real) -> Real {
        self.min + (self.max - self.min) * t
    }
}

impl BitAnd for ClosedInterval {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        self.intersection(&rhs)
    }
}

impl BitOr for ClosedInterval {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.union(&rhs)
    }
}

impl BitOr<Real> for ClosedInterval {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Real) -> Self {
        self.extended(rhs)
    }
}

impl Add<Real> for ClosedInterval {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Real) -> Self {
        if self.is_empty() {
            self
        } else {
            Self::new(self.min + rhs, self.max + rhs)
        }
    }
}

impl Sub<Real> for ClosedInterval {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Real) -> Self {
        if self.is_empty() {
            self
        } else {
            Self::new(self.min - rhs, self.max - rhs)
        }
    }
}

impl Mul<Real> for ClosedInterval {
    type Output = Self;

    fn mul(self, rhs: Real) -> Self {
        if self.is_empty() {
            self
        } else if rhs == 0.0 {
            Self::point(0.0)
        } else if rhs < 0.0 {
            Self::new(self.max * rhs, self.min * rhs)
        } else {
            Self::new(self.min * rhs, self.max * rhs)
        }
    }
}

impl Div<Real> for ClosedInterval {
    type Output = Self;

    /// Divides every point of this interval by `rhs`.
    ///
    /// Dividing by zero yields the whole line if the interval contains zero
    /// (the quotient is unconstrained) and the empty interval otherwise. This
    /// is the exact slab rule for axis-parallel rays.
    fn div(self, rhs: Real) -> Self {
        if self.is_empty() {
            self
        } else if rhs == 0.0 {
            if self.contains(0.0) {
                Self::ALL
            } else {
                Self::EMPTY
            }
        } else if rhs < 0.0 {
            Self::new(self.max / rhs, self.min / rhs)
        } else {
            Self::new(self.min / rhs, self.max / rhs)
        }
    }
}
