//! Bounding volumes.

#[doc(inline)]
pub use crate::bounding_volume::box3::Box3;

#[doc(hidden)]
pub mod box3;
