use crate::bounding_volume::Box3;
use crate::math::{Point, Real};

/// The order in which a traversal visits the two children of a branch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(i32)]
pub enum TraversalKernel {
    /// Always visit the left child first.
    LeftFirst = 11,
    /// Always visit the right child first.
    RightFirst = 12,
    /// Flip a fair coin.
    UniformRandom = 13,
    /// Visit first the child whose box center is closest to the ray origin.
    FrontToBack = 14,
    /// Visit first the child whose box center is farthest from the ray origin.
    BackToFront = 15,
}

impl TraversalKernel {
    /// All the kernels, in tag order.
    pub const ALL: [TraversalKernel; 5] = [
        TraversalKernel::LeftFirst,
        TraversalKernel::RightFirst,
        TraversalKernel::UniformRandom,
        TraversalKernel::FrontToBack,
        TraversalKernel::BackToFront,
    ];

    /// The probability that a ray starting at `origin` visits the child
    /// bounded by `left` before the one bounded by `right`.
    pub fn left_probability(self, origin: &Point<Real>, left: &Box3, right: &Box3) -> f64 {
        match self {
            TraversalKernel::LeftFirst => 1.0,
            TraversalKernel::RightFirst => 0.0,
            TraversalKernel::UniformRandom => 0.5,
            TraversalKernel::FrontToBack => {
                if left_is_closer(origin, &left.center(), &right.center()) {
                    1.0
                } else {
                    0.0
                }
            }
            TraversalKernel::BackToFront => {
                if left_is_closer(origin, &left.center(), &right.center()) {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }

    /// Whether this kernel visits children in an order that does not depend
    /// on the ray.
    pub fn is_fixed(self) -> bool {
        matches!(self, TraversalKernel::LeftFirst | TraversalKernel::RightFirst)
    }

    /// The kernel with the given serialized tag.
    pub fn from_tag(tag: i32) -> Option<TraversalKernel> {
        Self::ALL.into_iter().find(|k| *k as i32 == tag)
    }

    /// The flag enabling this kernel in a [`KernelFlags`] set.
    pub fn flag(self) -> KernelFlags {
        match self {
            TraversalKernel::LeftFirst => KernelFlags::LEFT_FIRST,
            TraversalKernel::RightFirst => KernelFlags::RIGHT_FIRST,
            TraversalKernel::UniformRandom => KernelFlags::UNIFORM_RANDOM,
            TraversalKernel::FrontToBack => KernelFlags::FRONT_TO_BACK,
            TraversalKernel::BackToFront => KernelFlags::BACK_TO_FRONT,
        }
    }
}

/// Is `left_center` strictly closer to `origin` than `right_center`?
#[inline]
pub fn left_is_closer(
    origin: &Point<Real>,
    left_center: &Point<Real>,
    right_center: &Point<Real>,
) -> bool {
    na::distance_squared(origin, left_center) < na::distance_squared(origin, right_center)
}

#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// A set of traversal kernels.
pub struct KernelFlags(u8);

bitflags::bitflags! {
    impl KernelFlags: u8 {
        /// See [`TraversalKernel::LeftFirst`].
        const LEFT_FIRST = 1;
        /// See [`TraversalKernel::RightFirst`].
        const RIGHT_FIRST = 1 << 1;
        /// See [`TraversalKernel::UniformRandom`].
        const UNIFORM_RANDOM = 1 << 2;
        /// See [`TraversalKernel::FrontToBack`].
        const FRONT_TO_BACK = 1 << 3;
        /// See [`TraversalKernel::BackToFront`].
        const BACK_TO_FRONT = 1 << 4;
        /// The two fixed orders.
        const FIXED = Self::LEFT_FIRST.bits() | Self::RIGHT_FIRST.bits();
        /// The four kernels a shadow-ray-driven build can choose from.
        const SRDH = Self::FIXED.bits() | Self::FRONT_TO_BACK.bits() | Self::BACK_TO_FRONT.bits();
    }
}

impl Default for KernelFlags {
    fn default() -> Self {
        KernelFlags::SRDH
    }
}
