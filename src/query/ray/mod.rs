//! Ray-casting related definitions and implementations.

#[doc(inline)]
pub use self::ray::{Ray, Segment};

#[doc(hidden)]
pub mod ray;
mod ray_box3;
mod ray_triangle;
