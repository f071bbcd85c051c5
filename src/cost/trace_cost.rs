use core::ops::{Add, AddAssign};
use num::Zero;

/// The expectation and variance of a random quantity.
///
/// Sums assume the operands are independent.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RandomVariable {
    /// The expected value.
    pub expected: f64,
    /// The variance.
    pub variance: f64,
}

impl RandomVariable {
    /// Creates a random variable with the given moments.
    #[inline]
    pub const fn new(expected: f64, variance: f64) -> Self {
        Self { expected, variance }
    }

    /// A deterministic quantity.
    #[inline]
    pub const fn constant(value: f64) -> Self {
        Self::new(value, 0.0)
    }

    /// The mixture taking the value of `x` with probability `p` and the value
    /// of `y` otherwise.
    pub fn random_select(p: f64, x: Self, y: Self) -> Self {
        let q = 1.0 - p;
        let d = x.expected - y.expected;
        Self::new(
            p * x.expected + q * y.expected,
            p * x.variance + q * y.variance + p * q * d * d,
        )
    }
}

impl Add for RandomVariable {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.expected + rhs.expected, self.variance + rhs.variance)
    }
}

impl AddAssign for RandomVariable {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Zero for RandomVariable {
    #[inline]
    fn zero() -> Self {
        Self::constant(0.0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.expected == 0.0 && self.variance == 0.0
    }
}

/// The number of box and primitive intersection tests performed by a
/// traversal.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TraceCost {
    /// Ray/box tests.
    pub bbox_tests: RandomVariable,
    /// Ray/triangle tests.
    pub primitive_tests: RandomVariable,
}

impl TraceCost {
    /// Creates a cost from its two components.
    #[inline]
    pub const fn new(bbox_tests: RandomVariable, primitive_tests: RandomVariable) -> Self {
        Self {
            bbox_tests,
            primitive_tests,
        }
    }

    /// A deterministic cost.
    #[inline]
    pub const fn constant(bbox_tests: f64, primitive_tests: f64) -> Self {
        Self::new(
            RandomVariable::constant(bbox_tests),
            RandomVariable::constant(primitive_tests),
        )
    }

    /// The cost of a single box test.
    pub const BBOX_TEST: Self = Self::constant(1.0, 0.0);

    /// Component-wise [`RandomVariable::random_select`].
    pub fn random_select(p: f64, x: Self, y: Self) -> Self {
        Self::new(
            RandomVariable::random_select(p, x.bbox_tests, y.bbox_tests),
            RandomVariable::random_select(p, x.primitive_tests, y.primitive_tests),
        )
    }

    /// This cost plus one box test.
    #[inline]
    pub fn with_bbox_test(mut self) -> Self {
        self.bbox_tests.expected += 1.0;
        self
    }
}

impl Add for TraceCost {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.bbox_tests + rhs.bbox_tests,
            self.primitive_tests + rhs.primitive_tests,
        )
    }
}

impl AddAssign for TraceCost {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Zero for TraceCost {
    #[inline]
    fn zero() -> Self {
        Self::default()
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.bbox_tests.is_zero() && self.primitive_tests.is_zero()
    }
}

/// Whether a shadow segment was found to be occluded, and at what cost.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TraceResult {
    /// Did the traversal find an occluder?
    pub hits: bool,
    /// The cost of the traversal.
    pub cost: TraceCost,
}

impl TraceResult {
    /// The result of a segment missing a box.
    pub const MISSED_BOX: Self = Self::new(false, TraceCost::BBOX_TEST);

    /// Creates a traversal result.
    #[inline]
    pub const fn new(hits: bool, cost: TraceCost) -> Self {
        Self { hits, cost }
    }
}
