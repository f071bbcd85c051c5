//! Rays, segments and recorded ray queries.
//!
//! Ray/box and ray/triangle intersection routines are implemented directly on
//! [`Box3`](crate::bounding_volume::Box3) and [`Triangle`](crate::shape::Triangle).
//! Recorded queries are turned into sample sets for the ray-driven builders
//! by [`RayCompiler`] and [`ShadowRayCompiler`].

pub use self::ray::{Ray, Segment};
pub use self::ray_compiler::{CompiledShadowRays, RayCompiler, ShadowRayCompiler};
pub use self::ray_set::{RayKind, RayQuery, RaySet, ShadowQuery};

mod ray;
mod ray_compiler;
mod ray_set;
