/*!
rbvh
========

**rbvh** builds binary bounding volume hierarchies over triangle soups and
measures how well they answer ray queries.

The crate is organized around a top-down binned builder that is generic over
three strategies: a split evaluator (the cost model), a node factory (the
payload stored in branches and leaves) and a triangle aggregator (the per-bin
statistics). On top of the resulting trees it provides two first-hit
traversals, an analytic visibility model and a family of expected-cost
measures for trees whose branches carry a (possibly randomized) traversal
kernel.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::type_complexity)]

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[macro_use]
extern crate approx;
extern crate num_traits as num;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod cost;
pub mod format;
pub mod partitioning;
pub mod query;
pub mod shape;
pub mod utils;

/// Aliases for the mathematical types used throughout this crate.
pub mod math {
    pub use na::{Point3, Vector3};

    /// The scalar type used for geometry.
    pub use f32 as Real;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;
}
